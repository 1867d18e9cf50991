use forge_transactions::{AuthorityKind, UtxoRef};
use forge_types::{Amount, Asset, TokenId};
use thiserror::Error;

use crate::reservation::ReservationId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insufficient {asset}: needed {needed}, available {available}")]
    InsufficientFunds {
        asset: Asset,
        needed: Amount,
        available: Amount,
    },

    #[error("no available {kind:?} authority for token {token}")]
    AuthorityNotFound { token: TokenId, kind: AuthorityKind },

    #[error("unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    #[error("duplicate utxo: {0}")]
    Duplicate(UtxoRef),

    #[error("utxo not found: {0}")]
    NotFound(UtxoRef),

    #[error("storage backend error: {0}")]
    Backend(String),
}
