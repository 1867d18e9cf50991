//! UTXO transaction model for the Forge wallet engine.
//!
//! A [`Transaction`] spends previous outputs ([`TxInput`]) and creates new
//! ones ([`TxOutput`]). Custom tokens are referenced through the
//! transaction's `tokens` list; each output's [`TokenData`] byte indexes into
//! it and flags authority outputs.
//!
//! Validation lives in [`validation`]:
//! - **structure**: limits, token indexes, authority masks, duplicate inputs
//! - **balance**: per-token conservation, melting, native redemption
//! - **signatures**: each input signed by the owner of the spent output

pub mod error;
pub mod input;
pub mod output;
pub mod script;
pub mod validation;

pub use error::TransactionError;
pub use input::{TxInput, UtxoRef};
pub use output::{AuthorityKind, TokenData, TxOutput};
pub use script::OutputScript;
pub use validation::{BalanceSummary, SpentOutput};

use forge_types::{Asset, TokenId, TxHash};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Custom tokens referenced by the outputs, in token-data index order.
    pub tokens: Vec<TokenId>,
    /// Hash of `signing_bytes()`. Zero until `seal()` is called.
    pub hash: TxHash,
}

/// The part of a transaction covered by signatures and the hash.
#[derive(Serialize)]
struct SigningView<'a> {
    inputs: Vec<&'a UtxoRef>,
    outputs: &'a [TxOutput],
    tokens: &'a [TokenId],
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, tokens: Vec<TokenId>) -> Self {
        Self {
            inputs,
            outputs,
            tokens,
            hash: TxHash::ZERO,
        }
    }

    /// Bytes every input signs: spent references, outputs and token list.
    ///
    /// Input keys and signatures are excluded so signing one input does not
    /// invalidate another.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let view = SigningView {
            inputs: self.inputs.iter().map(|i| &i.utxo).collect(),
            outputs: &self.outputs,
            tokens: &self.tokens,
        };
        bincode::serialize(&view).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn compute_hash(&self) -> Result<TxHash, TransactionError> {
        Ok(forge_crypto::hash_transaction(&self.signing_bytes()?))
    }

    /// Fill in `hash` from the current contents.
    pub fn seal(&mut self) -> Result<TxHash, TransactionError> {
        self.hash = self.compute_hash()?;
        Ok(self.hash)
    }

    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(TxInput::is_signed)
    }

    /// The asset an output's token data refers to, if the index is in range.
    pub fn asset_of(&self, output: &TxOutput) -> Option<Asset> {
        match output.token_data.token_index() {
            0 => Some(Asset::Native),
            i => self.tokens.get(i as usize - 1).copied().map(Asset::Token),
        }
    }

    /// 1-based token-data index for `token`, if it is listed.
    pub fn token_index(&self, token: &TokenId) -> Option<u8> {
        self.tokens
            .iter()
            .position(|t| t == token)
            .and_then(|i| u8::try_from(i + 1).ok())
    }
}
