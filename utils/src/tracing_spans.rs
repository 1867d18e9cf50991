//! Span constructors shared by the RPC layer and the wallet engine.
//!
//! Consistent span names and fields keep traces searchable.

use tracing::{info_span, Span};

/// One HTTP request handled by the wallet RPC server.
pub fn rpc_span(endpoint: &str, wallet_id: &str) -> Span {
    info_span!("rpc", endpoint = %endpoint, wallet = %wallet_id)
}

/// Building a melt transaction.
pub fn melt_span(wallet_id: &str, token: &str) -> Span {
    info_span!("melt", wallet = %wallet_id, token = %token)
}

/// Committing a built transaction and indexing its outputs.
pub fn submit_span(wallet_id: &str, tx_hash: &str) -> Span {
    info_span!("submit", wallet = %wallet_id, tx = %tx_hash)
}
