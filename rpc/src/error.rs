//! RPC error types and their HTTP mapping.
//!
//! Business failures are ordinary outcomes and answer 200 with
//! `success: false`. Only malformed requests and a missing wallet header
//! answer 400.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forge_wallet_core::{MeltError, WalletError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Header 'X-Wallet-Id' is required.")]
    MissingWalletId,

    #[error("Invalid wallet-id parameter.")]
    UnknownWallet(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Melt(#[from] MeltError),

    #[error("{0}")]
    Wallet(#[from] WalletError),

    #[error("{0}")]
    BadRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingWalletId | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Melt(e) if e.is_malformed() => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::MissingWalletId | Self::UnknownWallet(_) => {
                json!({ "success": false, "message": self.to_string() })
            }
            _ => json!({ "success": false, "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
