//! Forge daemon: serves wallet RPC over HTTP.

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use forge_rpc::{RpcServer, WalletRegistry};
use forge_store_mem::MemUtxoStore;
use forge_types::{NetworkId, ProtocolParams};
use forge_utils::LogFormat;
use forge_wallet_core::{KeyChain, Wallet};

use crate::config::DaemonConfig;
use crate::error::DaemonError;

#[derive(Parser)]
#[command(name = "forge-daemon", about = "Forge wallet daemon")]
struct Cli {
    /// Network: "live", "test", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "FORGE_NETWORK")]
    network: Option<NetworkId>,

    /// RPC server port (defaults to the network's port).
    #[arg(long, env = "FORGE_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FORGE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FORGE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format.to_string();
        }
        Ok(config)
    }
}

/// One in-memory store per wallet, funded with the configured outputs.
fn load_wallets(config: &DaemonConfig) -> Result<Arc<WalletRegistry>, DaemonError> {
    let registry = Arc::new(WalletRegistry::new());
    for wc in &config.wallets {
        let fail = |reason: String| DaemonError::Wallet {
            wallet: wc.id.clone(),
            reason,
        };
        let keychain =
            KeyChain::from_hex(&wc.seed_hex, config.network).map_err(|e| fail(e.to_string()))?;
        let wallet = Wallet::new(
            wc.id.clone(),
            keychain,
            wc.address_gap,
            Arc::new(MemUtxoStore::new()),
            ProtocolParams::default(),
        );
        for utxo in &wc.utxos {
            let asset = utxo.asset().map_err(fail)?;
            wallet
                .fund(utxo.index, asset, utxo.amount(), utxo.authority.map(Into::into))
                .map_err(|e| fail(e.to_string()))?;
        }
        tracing::info!(wallet = %wc.id, utxos = wc.utxos.len(), "wallet loaded");
        registry.insert(wallet);
    }
    Ok(registry)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping RPC server");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let print_config = cli.print_config;
    let config = cli.into_config()?;

    if print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let format: LogFormat = config.log_format.parse()?;
    forge_utils::init_logging(format, &config.log_level)?;

    if let Some(path) = config_path {
        tracing::info!("Loaded config from {}", path.display());
    }

    let registry = load_wallets(&config)?;
    if registry.is_empty() {
        tracing::warn!("no wallets configured; every wallet request will be rejected");
    }

    let addr = config.rpc_addr();
    tracing::info!(
        "Starting Forge daemon on {} network (RPC:{}, wallets: {})",
        config.network.as_str(),
        addr,
        registry.ids().join(", "),
    );

    RpcServer::new(addr, registry)
        .with_cors(config.rpc_cors)
        .serve(shutdown_signal())
        .await
        .context("RPC server failed")?;

    tracing::info!("Forge daemon exited cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::Asset;

    #[test]
    fn wallets_are_funded_from_config() {
        let config = DaemonConfig::from_toml_str(
            r#"
            [[wallets]]
            id = "a"
            seed_hex = "0101010101010101010101010101010101010101010101010101010101010101"
            [[wallets.utxos]]
            value = 7
            [[wallets.utxos]]
            index = 3
            value = 5
            "#,
        )
        .unwrap();
        let registry = load_wallets(&config).unwrap();
        let wallet = registry.get("a").unwrap();
        assert_eq!(wallet.balance(&Asset::Native).unwrap().raw(), 12);
        assert_eq!(
            wallet.address_info(3, &Asset::Native).unwrap().total_amount_available.raw(),
            5
        );
    }

    #[test]
    fn bad_seed_names_the_wallet() {
        let config = DaemonConfig::from_toml_str(
            r#"
            [[wallets]]
            id = "broken"
            seed_hex = "zz"
            "#,
        )
        .unwrap();
        let err = load_wallets(&config).err().unwrap();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn seed_output_beyond_address_window_fails() {
        let config = DaemonConfig::from_toml_str(
            r#"
            [[wallets]]
            id = "far"
            seed_hex = "0202020202020202020202020202020202020202020202020202020202020202"
            [[wallets.utxos]]
            index = 4000000000
            value = 1
            "#,
        )
        .unwrap();
        let err = load_wallets(&config).err().unwrap();
        assert!(err.to_string().contains("far"));
        assert!(err.to_string().contains("4000000000"));
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from(["forge-daemon", "--network", "test", "--rpc-port", "9000"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.network, NetworkId::Test);
        assert_eq!(config.rpc_addr().port(), 9000);
    }
}
