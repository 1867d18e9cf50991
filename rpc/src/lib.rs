//! HTTP API for Forge wallets.
//!
//! Endpoints (all wallet endpoints take the `x-wallet-id` header):
//! - `POST /wallet/melt-tokens`: melt a custom token into native currency
//! - `GET /wallet/balance`: available and locked balance of an asset
//! - `GET /wallet/address`: address at an index
//! - `GET /wallet/address-info`: funds held at one address
//! - `GET /health`

pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;

pub use error::RpcError;
pub use handlers::WALLET_ID_HEADER;
pub use registry::WalletRegistry;
pub use server::{router, RpcServer};
