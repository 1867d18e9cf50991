use forge_store::StoreError;
use forge_transactions::TransactionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid master seed: {0}")]
    InvalidSeed(String),

    #[error("address is not from this wallet: {0}")]
    AddressNotOwned(String),

    #[error("address index {0} is outside the wallet's address window")]
    UnknownAddressIndex(u32),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
