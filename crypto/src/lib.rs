//! Cryptographic primitives for the Forge wallet engine.
//!
//! - **Ed25519** for signing transaction inputs
//! - **Blake2b** for transaction hashes, address checksums and key-chain seeds
//! - Network-prefixed base32 addresses

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi, hash_transaction};
pub use keys::{derive_child_seed, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
