//! Unspent outputs as tracked by the index.

use forge_transactions::{AuthorityKind, SpentOutput, UtxoRef};
use forge_types::{Address, Amount, Asset};
use serde::{Deserialize, Serialize};

use crate::reservation::ReservationId;

/// An output the wallet owns and may spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub id: UtxoRef,
    pub asset: Asset,
    /// Units held, or the authority mask for authority outputs.
    pub value: Amount,
    pub address: Address,
    pub authority: Option<AuthorityKind>,
}

impl Utxo {
    pub fn is_authority(&self) -> bool {
        self.authority.is_some()
    }

    /// Whether this output counts toward the spendable balance of `asset`.
    pub fn holds(&self, asset: &Asset) -> bool {
        !self.is_authority() && &self.asset == asset
    }

    pub fn grants(&self, asset: &Asset, kind: AuthorityKind) -> bool {
        self.authority == Some(kind) && &self.asset == asset
    }

    pub fn to_spent_output(&self) -> SpentOutput {
        SpentOutput {
            asset: self.asset,
            value: self.value,
            authority: self.authority,
            address: self.address.clone(),
        }
    }
}

/// Lifecycle of an indexed output: `Available -> Reserved -> Spent`, or back
/// to `Available` when a reservation is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtxoStatus {
    Available,
    Reserved(ReservationId),
    Spent,
}
