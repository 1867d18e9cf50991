//! Reservation requests and the selections a store hands back.

use forge_transactions::AuthorityKind;
use forge_types::{Amount, Asset, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utxo::Utxo;

/// Handle to a set of outputs marked as reserved by one builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything one transaction needs, reserved atomically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationRequest {
    /// Value outputs covering at least `amount` of each asset.
    pub values: Vec<(Asset, Amount)>,
    /// One authority output of each kind for each token.
    pub authorities: Vec<(TokenId, AuthorityKind)>,
}

impl ReservationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value target. Zero targets are dropped; repeated assets accumulate.
    pub fn value(mut self, asset: Asset, amount: Amount) -> Self {
        if amount.is_zero() {
            return self;
        }
        match self.values.iter_mut().find(|(a, _)| *a == asset) {
            Some((_, total)) => *total = total.saturating_add(amount),
            None => self.values.push((asset, amount)),
        }
        self
    }

    pub fn authority(mut self, token: TokenId, kind: AuthorityKind) -> Self {
        if !self.authorities.contains(&(token, kind)) {
            self.authorities.push((token, kind));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.authorities.is_empty()
    }
}

/// Outputs chosen to cover one asset target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub asset: Asset,
    pub utxos: Vec<Utxo>,
    pub total: Amount,
}

impl Selection {
    /// What is left over after spending `amount` out of this selection.
    pub fn surplus(&self, amount: Amount) -> Amount {
        self.total.saturating_sub(amount)
    }
}

/// A granted reservation. Until committed or released, none of these outputs
/// can be handed to another caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub values: Vec<Selection>,
    pub authorities: Vec<Utxo>,
}

impl Reservation {
    pub fn selection(&self, asset: &Asset) -> Option<&Selection> {
        self.values.iter().find(|s| &s.asset == asset)
    }

    pub fn authority(&self, token: &TokenId, kind: AuthorityKind) -> Option<&Utxo> {
        self.authorities
            .iter()
            .find(|u| u.grants(&Asset::Token(*token), kind))
    }

    /// Every reserved output: value selections first, then authorities.
    pub fn utxos(&self) -> impl Iterator<Item = &Utxo> {
        self.values
            .iter()
            .flat_map(|s| s.utxos.iter())
            .chain(self.authorities.iter())
    }
}
