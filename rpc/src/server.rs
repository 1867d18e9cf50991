//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error::RpcError;
use crate::handlers::{self, AppState};
use crate::registry::WalletRegistry;

pub fn router(registry: Arc<WalletRegistry>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/wallet/melt-tokens", post(handlers::melt_tokens))
        .route("/wallet/balance", get(handlers::balance))
        .route("/wallet/address", get(handlers::address))
        .route("/wallet/address-info", get(handlers::address_info))
        .with_state(AppState { registry })
}

pub struct RpcServer {
    pub bind: SocketAddr,
    pub registry: Arc<WalletRegistry>,
    pub cors: bool,
}

impl RpcServer {
    pub fn new(bind: SocketAddr, registry: Arc<WalletRegistry>) -> Self {
        Self {
            bind,
            registry,
            cors: false,
        }
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn router(&self) -> Router {
        let app = router(Arc::clone(&self.registry));
        if self.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.bind)))?;
        tracing::info!(addr = %self.bind, wallets = self.registry.len(), "RPC server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
