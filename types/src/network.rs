//! Network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ForgeError;

/// Identifies which network a wallet operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network.
    Test,
    /// Local development network.
    Dev,
}

impl NetworkId {
    /// Default port for the wallet RPC server on this network.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Self::Live => 8000,
            Self::Test => 18000,
            Self::Dev => 28000,
        }
    }

    /// Prefix every address on this network starts with.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Self::Live => "frg_",
            Self::Test => "tfrg_",
            Self::Dev => "dfrg_",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }
}

impl FromStr for NetworkId {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            "dev" => Ok(Self::Dev),
            other => Err(ForgeError::UnknownNetwork(other.to_string())),
        }
    }
}
