//! Turns a fully resolved melt plan into an unsigned transaction.
//!
//! Value outputs come first in a fixed order (redemption, token change,
//! native change, authority). Data outputs are placed last, in
//! [`place_data_outputs`], so ordering never touches conservation.

use forge_transactions::{
    AuthorityKind, OutputScript, TokenData, Transaction, TxInput, TxOutput, UtxoRef,
};
use forge_types::{Amount, ProtocolParams, TokenId};

/// Everything the assembler needs, already selected and resolved.
#[derive(Clone, Debug)]
pub struct MeltPlan {
    pub token: TokenId,
    /// Token value inputs, native inputs funding data outputs, then the authority.
    pub inputs: Vec<UtxoRef>,
    pub redemption: Amount,
    pub deposit: OutputScript,
    pub token_change: Amount,
    pub native_change: Amount,
    pub change: OutputScript,
    pub authority: OutputScript,
    pub data: Vec<Vec<u8>>,
    pub unshift_data: bool,
}

pub fn assemble(plan: &MeltPlan, params: &ProtocolParams) -> Transaction {
    let mut outputs = Vec::with_capacity(plan.data.len() + 4);

    if !plan.redemption.is_zero() {
        outputs.push(TxOutput::new(
            plan.redemption,
            TokenData::native(),
            plan.deposit.clone(),
        ));
    }
    if !plan.token_change.is_zero() {
        outputs.push(TxOutput::new(
            plan.token_change,
            TokenData::token(1),
            plan.change.clone(),
        ));
    }
    if !plan.native_change.is_zero() {
        outputs.push(TxOutput::new(
            plan.native_change,
            TokenData::native(),
            plan.change.clone(),
        ));
    }
    outputs.push(TxOutput::new(
        AuthorityKind::Melt.mask(params),
        TokenData::authority(1),
        plan.authority.clone(),
    ));

    let data = plan
        .data
        .iter()
        .map(|d| TxOutput::new(params.data_output_value, TokenData::native(), OutputScript::data(d.clone())))
        .collect();
    place_data_outputs(&mut outputs, data, plan.unshift_data);

    Transaction::new(
        plan.inputs.iter().copied().map(TxInput::unsigned).collect(),
        outputs,
        vec![plan.token],
    )
}

/// With `unshift`, each data output is inserted at the front in turn, so the
/// last entry ends up first. Otherwise they are appended in order.
pub fn place_data_outputs(outputs: &mut Vec<TxOutput>, data: Vec<TxOutput>, unshift: bool) {
    if unshift {
        for output in data {
            outputs.insert(0, output);
        }
    } else {
        outputs.extend(data);
    }
}
