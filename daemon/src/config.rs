//! Daemon configuration with TOML file support.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use forge_transactions::AuthorityKind;
use forge_types::{Amount, Asset, NetworkId, TokenId};
use forge_wallet_core::DEFAULT_ADDRESS_GAP;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// Configuration for a Forge wallet daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; CLI flags
/// and environment variables override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Interface the RPC server binds to.
    #[serde(default = "default_rpc_bind")]
    pub rpc_bind: IpAddr,

    /// RPC port. Zero means the network's default port.
    #[serde(default)]
    pub rpc_port: u16,

    /// Answer cross-origin requests from any origin.
    #[serde(default)]
    pub rpc_cors: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletConfig {
    pub id: String,

    /// Hex-encoded 32-byte master seed.
    pub seed_hex: String,

    #[serde(default = "default_address_gap")]
    pub address_gap: u32,

    /// Outputs credited to the wallet at startup.
    #[serde(default)]
    pub utxos: Vec<SeedUtxo>,
}

/// An output credited to a wallet address when the daemon starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedUtxo {
    /// Address index the output is locked to.
    #[serde(default)]
    pub index: u32,

    /// `"native"` or a token id in hex.
    #[serde(default = "default_token")]
    pub token: String,

    pub value: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<SeedAuthority>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedAuthority {
    Mint,
    Melt,
}

impl From<SeedAuthority> for AuthorityKind {
    fn from(a: SeedAuthority) -> Self {
        match a {
            SeedAuthority::Mint => AuthorityKind::Mint,
            SeedAuthority::Melt => AuthorityKind::Melt,
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_rpc_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_address_gap() -> u32 {
    DEFAULT_ADDRESS_GAP
}

fn default_token() -> String {
    "native".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DaemonError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        let config: Self = toml::from_str(s).map_err(|e| DaemonError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, DaemonError> {
        toml::to_string_pretty(self).map_err(|e| DaemonError::Config(e.to_string()))
    }

    pub fn rpc_addr(&self) -> SocketAddr {
        let port = if self.rpc_port == 0 {
            self.network.default_rpc_port()
        } else {
            self.rpc_port
        };
        SocketAddr::new(self.rpc_bind, port)
    }

    fn check(&self) -> Result<(), DaemonError> {
        let mut seen = std::collections::HashSet::new();
        for wallet in &self.wallets {
            if wallet.id.trim().is_empty() {
                return Err(DaemonError::Config("wallet id must not be empty".into()));
            }
            if !seen.insert(wallet.id.as_str()) {
                return Err(DaemonError::Config(format!("duplicate wallet id '{}'", wallet.id)));
            }
            for utxo in &wallet.utxos {
                utxo.asset().map_err(|reason| DaemonError::Wallet {
                    wallet: wallet.id.clone(),
                    reason,
                })?;
            }
        }
        Ok(())
    }
}

impl SeedUtxo {
    pub fn asset(&self) -> Result<Asset, String> {
        match self.token.trim() {
            "native" => Ok(Asset::Native),
            hex => hex
                .parse::<TokenId>()
                .map(Asset::Token)
                .map_err(|e| e.to_string()),
        }
    }

    pub fn amount(&self) -> Amount {
        Amount::new(self.value)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_bind: default_rpc_bind(),
            rpc_port: 0,
            rpc_cors: false,
            log_format: default_log_format(),
            log_level: default_log_level(),
            wallets: Vec::new(),
        }
    }
}
