//! Wallet core library for Forge.
//!
//! Provides what a wallet service needs to melt custom tokens:
//! - Deterministic key chain and a gap-limited address window
//! - Address ownership and change allocation ([`AddressBook`])
//! - Input signing ([`TxSigner`])
//! - The melt transaction builder ([`melt`])

pub mod addresses;
pub mod error;
pub mod keys;
pub mod melt;
pub mod signer;
pub mod wallet;

pub use addresses::{AddressBook, AddressWindow};
pub use error::WalletError;
pub use keys::KeyChain;
pub use melt::{MeltError, MeltRequest, PendingMelt, ValidationError};
pub use signer::TxSigner;
pub use wallet::{AddressInfo, Wallet, DEFAULT_ADDRESS_GAP, DEFAULT_ADDRESS_INDEX};
