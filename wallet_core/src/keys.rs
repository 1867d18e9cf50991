//! Deterministic key chain: one master seed, one key pair per index.

use forge_types::{Address, KeyPair, NetworkId};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyChain {
    master_seed: [u8; 32],
    #[zeroize(skip)]
    network: NetworkId,
}

impl KeyChain {
    pub fn new(master_seed: [u8; 32], network: NetworkId) -> Self {
        Self {
            master_seed,
            network,
        }
    }

    /// Parse a 64-character hex master seed.
    pub fn from_hex(seed_hex: &str, network: NetworkId) -> Result<Self, WalletError> {
        let mut seed = [0u8; 32];
        hex::decode_to_slice(seed_hex.trim(), &mut seed)
            .map_err(|e| WalletError::InvalidSeed(e.to_string()))?;
        Ok(Self::new(seed, network))
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    pub fn keypair_at(&self, index: u32) -> KeyPair {
        let child = forge_crypto::derive_child_seed(&self.master_seed, index);
        forge_crypto::keypair_from_seed(&child)
    }

    pub fn address_at(&self, index: u32) -> Address {
        forge_crypto::derive_address(&self.keypair_at(index).public, self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_addresses() {
        let a = KeyChain::new([3u8; 32], NetworkId::Test);
        let b = KeyChain::new([3u8; 32], NetworkId::Test);
        assert_eq!(a.address_at(5), b.address_at(5));
        assert_ne!(a.address_at(0), a.address_at(1));
    }

    #[test]
    fn network_prefix_applies() {
        let chain = KeyChain::new([3u8; 32], NetworkId::Test);
        assert!(chain.address_at(0).as_str().starts_with("tfrg_"));
        assert!(forge_crypto::validate_address(
            chain.address_at(7).as_str(),
            NetworkId::Test
        ));
    }

    #[test]
    fn seed_hex_parsing() {
        let hex_seed = "ab".repeat(32);
        let chain = KeyChain::from_hex(&hex_seed, NetworkId::Dev).unwrap();
        assert_eq!(chain.address_at(0), KeyChain::new([0xab; 32], NetworkId::Dev).address_at(0));
        assert!(matches!(
            KeyChain::from_hex("abcd", NetworkId::Dev),
            Err(WalletError::InvalidSeed(_))
        ));
    }
}
