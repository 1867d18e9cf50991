//! Wallets served by this process, keyed by wallet id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use forge_wallet_core::Wallet;

#[derive(Default)]
pub struct WalletRegistry {
    wallets: RwLock<HashMap<String, Arc<Wallet>>>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a wallet under its id, replacing any previous one.
    pub fn insert(&self, wallet: Wallet) -> Arc<Wallet> {
        let wallet = Arc::new(wallet);
        self.wallets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(wallet.id().to_string(), Arc::clone(&wallet));
        wallet
    }

    pub fn get(&self, id: &str) -> Option<Arc<Wallet>> {
        self.wallets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Wallet>> {
        self.wallets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .wallets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.wallets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
