//! Transaction inputs and references to the outputs they spend.

use forge_types::{PublicKey, Signature, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points at output `index` of transaction `tx_hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoRef {
    pub tx_hash: TxHash,
    pub index: u8,
}

impl UtxoRef {
    pub fn new(tx_hash: TxHash, index: u8) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for UtxoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// A spend of one previous output.
///
/// `public_key` and `signature` stay `None` until the transaction is signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub utxo: UtxoRef,
    pub public_key: Option<PublicKey>,
    pub signature: Option<Signature>,
}

impl TxInput {
    pub fn unsigned(utxo: UtxoRef) -> Self {
        Self {
            utxo,
            public_key: None,
            signature: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.public_key.is_some() && self.signature.is_some()
    }
}
