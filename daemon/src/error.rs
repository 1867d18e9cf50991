use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("wallet '{wallet}': {reason}")]
    Wallet { wallet: String, reason: String },
}
