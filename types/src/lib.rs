//! Fundamental types for the Forge wallet engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, hashes, token identifiers, amounts, keys, protocol parameters and networks.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod params;
pub mod token;

pub use address::Address;
pub use amount::Amount;
pub use error::ForgeError;
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use params::ProtocolParams;
pub use token::{Asset, TokenId};
