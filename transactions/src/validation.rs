//! Stateless and input-resolved transaction validation.
//!
//! `validate_structure` needs only the transaction. `validate_balance` and
//! `verify_signatures` need the outputs being spent, resolved by the caller
//! from its UTXO index, in input order.

use std::collections::{BTreeMap, HashSet};

use forge_types::{Address, Amount, Asset, NetworkId, ProtocolParams, TokenId};

use crate::error::TransactionError;
use crate::output::AuthorityKind;
use crate::Transaction;

/// A previous output as seen by the transaction spending it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpentOutput {
    pub asset: Asset,
    pub value: Amount,
    pub authority: Option<AuthorityKind>,
    pub address: Address,
}

/// What a balanced transaction does to each asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSummary {
    /// Token units destroyed, per token. Only tokens with a non-zero melt appear.
    pub melted: BTreeMap<TokenId, Amount>,
    /// Native units released by melting.
    pub redeemed: Amount,
    pub native_in: Amount,
    pub native_out: Amount,
}

/// Check limits, token references, authority markers and duplicate spends.
pub fn validate_structure(tx: &Transaction, params: &ProtocolParams) -> Result<(), TransactionError> {
    if tx.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    if tx.inputs.len() > params.max_inputs {
        return Err(TransactionError::TooManyInputs {
            count: tx.inputs.len(),
            max: params.max_inputs,
        });
    }
    if tx.outputs.len() > params.max_outputs {
        return Err(TransactionError::TooManyOutputs {
            count: tx.outputs.len(),
            max: params.max_outputs,
        });
    }

    let mut seen = HashSet::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        if !seen.insert(input.utxo) {
            return Err(TransactionError::DuplicateInput(input.utxo.to_string()));
        }
    }

    let mut tokens = HashSet::with_capacity(tx.tokens.len());
    for token in &tx.tokens {
        if !tokens.insert(token) {
            return Err(TransactionError::DuplicateToken(*token));
        }
    }

    for (index, output) in tx.outputs.iter().enumerate() {
        let token_index = output.token_data.token_index();
        if token_index as usize > tx.tokens.len() {
            return Err(TransactionError::UnknownTokenIndex {
                index,
                token_index,
                tokens: tx.tokens.len(),
            });
        }
        if output.token_data.is_authority() {
            if output.token_data.is_native() {
                return Err(TransactionError::NativeAuthority(index));
            }
            if output.authority(params).is_none() {
                return Err(TransactionError::UnknownAuthorityValue {
                    index,
                    value: output.value,
                });
            }
        }
        let len = output.script.data_len();
        if len > params.max_data_script_len {
            return Err(TransactionError::DataTooLong {
                index,
                len,
                max: params.max_data_script_len,
            });
        }
    }

    Ok(())
}

/// Check conservation of every asset given the outputs being spent.
///
/// Tokens may only decrease, and only with a melt authority among the
/// inputs. Native outputs must equal native inputs plus
/// `floor(melted / divisor)` for each melted token.
pub fn validate_balance(
    tx: &Transaction,
    spent: &[SpentOutput],
    params: &ProtocolParams,
) -> Result<BalanceSummary, TransactionError> {
    if spent.len() != tx.inputs.len() {
        return Err(TransactionError::InputCountMismatch {
            expected: tx.inputs.len(),
            got: spent.len(),
        });
    }

    let mut native_in = Amount::ZERO;
    let mut token_in: BTreeMap<TokenId, Amount> = BTreeMap::new();
    let mut authorities: HashSet<(TokenId, AuthorityKind)> = HashSet::new();

    for (index, input) in spent.iter().enumerate() {
        match input.asset {
            Asset::Native => {
                native_in = native_in
                    .checked_add(input.value)
                    .ok_or(TransactionError::Overflow)?;
            }
            Asset::Token(token) => {
                if !tx.tokens.contains(&token) {
                    return Err(TransactionError::UnlistedInputToken { index, token });
                }
                match input.authority {
                    Some(kind) => {
                        authorities.insert((token, kind));
                    }
                    None => {
                        let total = token_in.entry(token).or_default();
                        *total = total.checked_add(input.value).ok_or(TransactionError::Overflow)?;
                    }
                }
            }
        }
    }

    let mut native_out = Amount::ZERO;
    let mut token_out: BTreeMap<TokenId, Amount> = BTreeMap::new();

    for (index, output) in tx.outputs.iter().enumerate() {
        let asset = tx.asset_of(output).ok_or(TransactionError::UnknownTokenIndex {
            index,
            token_index: output.token_data.token_index(),
            tokens: tx.tokens.len(),
        })?;
        match asset {
            Asset::Native => {
                if output.token_data.is_authority() {
                    return Err(TransactionError::NativeAuthority(index));
                }
                native_out = native_out
                    .checked_add(output.value)
                    .ok_or(TransactionError::Overflow)?;
            }
            Asset::Token(token) => {
                if output.token_data.is_authority() {
                    let kind = output.authority(params).ok_or(
                        TransactionError::UnknownAuthorityValue {
                            index,
                            value: output.value,
                        },
                    )?;
                    if !authorities.contains(&(token, kind)) {
                        return Err(TransactionError::AuthorityWithoutInput(token));
                    }
                } else {
                    let total = token_out.entry(token).or_default();
                    *total = total.checked_add(output.value).ok_or(TransactionError::Overflow)?;
                }
            }
        }
    }

    let mut summary = BalanceSummary {
        native_in,
        native_out,
        ..BalanceSummary::default()
    };

    for token in &tx.tokens {
        let inputs = token_in.get(token).copied().unwrap_or_default();
        let outputs = token_out.get(token).copied().unwrap_or_default();
        let melted = inputs
            .checked_sub(outputs)
            .ok_or(TransactionError::TokenCreated {
                token: *token,
                inputs,
                outputs,
            })?;
        if melted.is_zero() {
            continue;
        }
        if !authorities.contains(&(*token, AuthorityKind::Melt)) {
            return Err(TransactionError::MeltWithoutAuthority(*token));
        }
        let released = Amount::new(melted.raw() / params.melt_redemption_divisor.max(1));
        summary.redeemed = summary
            .redeemed
            .checked_add(released)
            .ok_or(TransactionError::Overflow)?;
        summary.melted.insert(*token, melted);
    }

    let expected = native_in
        .checked_add(summary.redeemed)
        .ok_or(TransactionError::Overflow)?;
    if expected != native_out {
        return Err(TransactionError::NativeImbalance {
            inputs: native_in,
            outputs: native_out,
            redeemed: summary.redeemed,
        });
    }

    Ok(summary)
}

/// Check every input is signed over `signing_bytes()` by the key that owns
/// the output it spends.
pub fn verify_signatures(
    tx: &Transaction,
    spent: &[SpentOutput],
    network: NetworkId,
) -> Result<(), TransactionError> {
    if spent.len() != tx.inputs.len() {
        return Err(TransactionError::InputCountMismatch {
            expected: tx.inputs.len(),
            got: spent.len(),
        });
    }
    let message = tx.signing_bytes()?;
    for (index, (input, prev)) in tx.inputs.iter().zip(spent).enumerate() {
        let (Some(public_key), Some(signature)) = (&input.public_key, &input.signature) else {
            return Err(TransactionError::MissingSignature(index));
        };
        if forge_crypto::derive_address(public_key, network) != prev.address {
            return Err(TransactionError::WrongSigner(index));
        }
        if !forge_crypto::verify_signature(&message, signature, public_key) {
            return Err(TransactionError::InvalidSignature(index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutputScript, TokenData, TxInput, TxOutput, UtxoRef};
    use forge_types::{KeyPair, TxHash};

    const NET: NetworkId = NetworkId::Test;

    fn token() -> TokenId {
        TokenId::new([0xAB; 32])
    }

    fn owner() -> KeyPair {
        forge_crypto::keypair_from_seed(&[7u8; 32])
    }

    fn owner_script() -> OutputScript {
        OutputScript::P2pkh {
            public_key: owner().public,
        }
    }

    fn owner_address() -> Address {
        forge_crypto::derive_address(&owner().public, NET)
    }

    fn input(n: u8) -> TxInput {
        TxInput::unsigned(UtxoRef::new(TxHash::new([n; 32]), 0))
    }

    fn prev_output(asset: Asset, value: u64, authority: Option<AuthorityKind>) -> SpentOutput {
        SpentOutput {
            asset,
            value: Amount::new(value),
            authority,
            address: owner_address(),
        }
    }

    /// Melt 500 of 1000 tokens, redeeming 5 native units.
    fn melt_tx() -> (Transaction, Vec<SpentOutput>) {
        let tx = Transaction::new(
            vec![input(1), input(2)],
            vec![
                TxOutput::new(Amount::new(500), TokenData::token(1), owner_script()),
                TxOutput::new(Amount::new(2), TokenData::authority(1), owner_script()),
                TxOutput::new(Amount::new(5), TokenData::native(), owner_script()),
            ],
            vec![token()],
        );
        let spent = vec![
            prev_output(Asset::Token(token()), 1000, None),
            prev_output(Asset::Token(token()), 2, Some(AuthorityKind::Melt)),
        ];
        (tx, spent)
    }

    fn sign_all(tx: &mut Transaction, keys: &KeyPair) {
        let message = tx.signing_bytes().unwrap();
        let signature = forge_crypto::sign_message(&message, &keys.private);
        for input in &mut tx.inputs {
            input.public_key = Some(keys.public);
            input.signature = Some(signature.clone());
        }
    }

    #[test]
    fn melt_balances() {
        let (tx, spent) = melt_tx();
        let params = ProtocolParams::default();
        validate_structure(&tx, &params).unwrap();
        let summary = validate_balance(&tx, &spent, &params).unwrap();
        assert_eq!(summary.melted.get(&token()), Some(&Amount::new(500)));
        assert_eq!(summary.redeemed, Amount::new(5));
        assert_eq!(summary.native_out, Amount::new(5));
    }

    #[test]
    fn melt_without_authority_rejected() {
        let (mut tx, mut spent) = melt_tx();
        tx.outputs.remove(1);
        spent[1] = prev_output(Asset::Token(token()), 2, Some(AuthorityKind::Mint));
        let err = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap_err();
        assert!(matches!(err, TransactionError::MeltWithoutAuthority(_)));
    }

    #[test]
    fn authority_output_needs_authority_input() {
        let (tx, mut spent) = melt_tx();
        spent[1].authority = Some(AuthorityKind::Mint);
        let err = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap_err();
        assert!(matches!(err, TransactionError::AuthorityWithoutInput(_)));
    }

    #[test]
    fn over_redemption_rejected() {
        let (mut tx, spent) = melt_tx();
        tx.outputs[2].value = Amount::new(6);
        let err = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap_err();
        assert!(matches!(err, TransactionError::NativeImbalance { .. }));
    }

    #[test]
    fn token_creation_rejected() {
        let (mut tx, spent) = melt_tx();
        tx.outputs[0].value = Amount::new(1001);
        let err = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap_err();
        assert!(matches!(err, TransactionError::TokenCreated { .. }));
    }

    #[test]
    fn remainder_below_divisor_is_destroyed() {
        let (mut tx, spent) = melt_tx();
        // Melt 599: still redeems 5.
        tx.outputs[0].value = Amount::new(401);
        let summary = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap();
        assert_eq!(summary.redeemed, Amount::new(5));
    }

    #[test]
    fn data_output_is_paid_from_native_inputs() {
        let (mut tx, mut spent) = melt_tx();
        tx.inputs.push(input(3));
        spent.push(prev_output(Asset::Native, 1, None));
        tx.outputs
            .insert(0, TxOutput::new(Amount::new(1), TokenData::native(), OutputScript::data(b"foobar".to_vec())));
        let summary = validate_balance(&tx, &spent, &ProtocolParams::default()).unwrap();
        assert_eq!(summary.native_in, Amount::new(1));
        assert_eq!(summary.native_out, Amount::new(6));
    }

    #[test]
    fn structure_checks() {
        let params = ProtocolParams::default();
        let (tx, _) = melt_tx();

        let mut dup = tx.clone();
        dup.inputs.push(input(1));
        assert!(matches!(
            validate_structure(&dup, &params),
            Err(TransactionError::DuplicateInput(_))
        ));

        let mut dangling = tx.clone();
        dangling.outputs[0].token_data = TokenData::token(2);
        assert!(matches!(
            validate_structure(&dangling, &params),
            Err(TransactionError::UnknownTokenIndex { token_index: 2, .. })
        ));

        let mut native_auth = tx.clone();
        native_auth.outputs[1].token_data = TokenData::authority(0);
        assert!(matches!(
            validate_structure(&native_auth, &params),
            Err(TransactionError::NativeAuthority(1))
        ));

        let mut bad_mask = tx.clone();
        bad_mask.outputs[1].value = Amount::new(7);
        assert!(matches!(
            validate_structure(&bad_mask, &params),
            Err(TransactionError::UnknownAuthorityValue { index: 1, .. })
        ));

        let mut long = tx.clone();
        long.outputs
            .push(TxOutput::new(Amount::new(1), TokenData::native(), OutputScript::data(vec![0u8; 151])));
        assert!(matches!(
            validate_structure(&long, &params),
            Err(TransactionError::DataTooLong { len: 151, .. })
        ));

        let empty = Transaction::new(vec![], tx.outputs.clone(), tx.tokens.clone());
        assert!(matches!(
            validate_structure(&empty, &params),
            Err(TransactionError::NoInputs)
        ));
    }

    #[test]
    fn signatures_verify() {
        let (mut tx, spent) = melt_tx();
        assert!(matches!(
            verify_signatures(&tx, &spent, NET),
            Err(TransactionError::MissingSignature(0))
        ));
        sign_all(&mut tx, &owner());
        verify_signatures(&tx, &spent, NET).unwrap();
    }

    #[test]
    fn signature_from_wrong_key_rejected() {
        let (mut tx, spent) = melt_tx();
        sign_all(&mut tx, &forge_crypto::keypair_from_seed(&[8u8; 32]));
        assert!(matches!(
            verify_signatures(&tx, &spent, NET),
            Err(TransactionError::WrongSigner(0))
        ));
    }

    #[test]
    fn tampered_output_invalidates_signature() {
        let (mut tx, spent) = melt_tx();
        sign_all(&mut tx, &owner());
        tx.outputs[2].value = Amount::new(4);
        assert!(matches!(
            verify_signatures(&tx, &spent, NET),
            Err(TransactionError::InvalidSignature(0))
        ));
    }
}
