//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the Forge workspace.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("amount overflow")]
    AmountOverflow,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}
