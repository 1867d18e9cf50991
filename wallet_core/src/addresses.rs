//! Address ownership and allocation.
//!
//! The wallet watches a window of derived addresses. The window always
//! extends `gap` indexes past the highest index that has received an output,
//! so addresses handed out for change are recognized when funds arrive.

use std::collections::{BTreeSet, HashMap};

use forge_types::{Address, NetworkId};

use crate::keys::KeyChain;

/// What the melt builder needs to know about the wallet's addresses.
pub trait AddressBook: Send + Sync {
    fn network(&self) -> NetworkId;

    /// Derivation index of `address`, or `None` if it is not from this wallet.
    fn owned_index(&self, address: &Address) -> Option<u32>;

    /// The wallet's stable receiving address.
    fn default_receiving_address(&self) -> Address;

    /// An address for change outputs, avoiding `exclude` when possible.
    fn allocate_change_address(&self, exclude: &[Address]) -> Address;
}

/// Derived addresses and the set of indexes that have received outputs.
pub struct AddressWindow {
    gap: u32,
    addresses: Vec<Address>,
    by_address: HashMap<Address, u32>,
    used: BTreeSet<u32>,
}

impl AddressWindow {
    pub fn new(keychain: &KeyChain, gap: u32) -> Self {
        let mut window = Self {
            gap: gap.max(1),
            addresses: Vec::new(),
            by_address: HashMap::new(),
            used: BTreeSet::new(),
        };
        window.extend_to(keychain, window.gap);
        window
    }

    fn extend_to(&mut self, keychain: &KeyChain, len: u32) {
        while (self.addresses.len() as u32) < len {
            let index = self.addresses.len() as u32;
            let address = keychain.address_at(index);
            self.by_address.insert(address.clone(), index);
            self.addresses.push(address);
        }
    }

    pub fn len(&self) -> u32 {
        self.addresses.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn index_of(&self, address: &Address) -> Option<u32> {
        self.by_address.get(address).copied()
    }

    pub fn address_at(&self, index: u32) -> Option<&Address> {
        self.addresses.get(index as usize)
    }

    pub fn is_used(&self, index: u32) -> bool {
        self.used.contains(&index)
    }

    /// Record that `index` received an output and slide the window forward.
    pub fn mark_used(&mut self, keychain: &KeyChain, index: u32) {
        self.used.insert(index);
        let wanted = index.saturating_add(1).saturating_add(self.gap);
        self.extend_to(keychain, wanted);
    }

    /// Lowest never-used index whose address is not in `exclude`.
    pub fn next_unused(&self, exclude: &[Address]) -> Option<u32> {
        (0..self.len()).find(|i| {
            !self.is_used(*i)
                && self
                    .address_at(*i)
                    .map_or(false, |a| !exclude.contains(a))
        })
    }
}
