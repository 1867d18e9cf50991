//! Ed25519 key handling and the deterministic per-index key chain.

use ed25519_dalek::SigningKey;
use forge_types::{KeyPair, PrivateKey, PublicKey};

use crate::hash::blake2b_256_multi;

/// Domain separator mixed into every child seed.
const CHILD_SEED_TAG: &[u8] = b"forge/child-seed/v1";

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Seed for the key at `index` under `master`.
///
/// `Blake2b-256(tag || master || index_le)`. Distinct indices give
/// independent keys; the same inputs always give the same key.
pub fn derive_child_seed(master: &[u8; 32], index: u32) -> [u8; 32] {
    blake2b_256_multi(&[CHILD_SEED_TAG, master, &index.to_le_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_from_seed_deterministic() {
        let kp1 = keypair_from_seed(&[42u8; 32]);
        let kp2 = keypair_from_seed(&[42u8; 32]);
        assert_eq!(kp1.public, kp2.public);
        assert_eq!(kp1.private.0, kp2.private.0);
    }

    #[test]
    fn public_from_private_matches() {
        let kp = keypair_from_seed(&[3u8; 32]);
        assert_eq!(public_from_private(&kp.private), kp.public);
    }

    #[test]
    fn child_seeds_differ_by_index() {
        let master = [7u8; 32];
        assert_ne!(derive_child_seed(&master, 0), derive_child_seed(&master, 1));
        assert_eq!(derive_child_seed(&master, 5), derive_child_seed(&master, 5));
    }

    #[test]
    fn child_seeds_differ_by_master() {
        assert_ne!(
            derive_child_seed(&[1u8; 32], 0),
            derive_child_seed(&[2u8; 32], 0)
        );
    }
}
