use forge_store::StoreError;
use forge_transactions::TransactionError;
use forge_types::{Address, Amount, TokenId};
use thiserror::Error;

use crate::error::WalletError;

/// A melt request that fails before any output is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid amount: expected a positive integer, got {0}")]
    InvalidAmount(String),

    #[error("invalid amount: must be greater than zero, got {0}")]
    NonPositiveAmount(String),

    #[error("Invalid deposit address: {0}")]
    InvalidAddress(String),

    #[error("Change address is not from this wallet: {0}")]
    ChangeAddressNotOwned(String),

    #[error("invalid data entry at position {index}: {reason}")]
    InvalidData { index: usize, reason: String },

    #[error("too many data outputs: {count} (max {max})")]
    TooManyDataOutputs { count: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum MeltError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not enough tokens to melt: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Not enough native funds for data outputs: needed {needed}, available {available}")]
    InsufficientNativeForData { needed: Amount, available: Amount },

    #[error("No melt authority available for token {0}")]
    AuthorityUnavailable(TokenId),

    #[error(
        "Melt authority address is not from this wallet: {0}. \
         Set allow_external_melt_authority_address to send it elsewhere"
    )]
    ExternalAuthorityNotAllowed(Address),

    #[error("Invalid melt authority address: {0}")]
    InvalidAuthorityAddress(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("assembled transaction does not validate: {0}")]
    Unbalanced(#[from] TransactionError),
}

impl MeltError {
    /// Errors caused by a malformed request rather than wallet state.
    ///
    /// These map to a transport-level 400; everything else is a business
    /// failure reported with `success: false`.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Validation(
                ValidationError::InvalidAmount(_)
                    | ValidationError::NonPositiveAmount(_)
                    | ValidationError::InvalidData { .. }
                    | ValidationError::TooManyDataOutputs { .. }
            )
        )
    }
}

impl From<WalletError> for MeltError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Store(e) => Self::Store(e),
            WalletError::Transaction(e) => Self::Unbalanced(e),
            other => Self::Signing(other.to_string()),
        }
    }
}
