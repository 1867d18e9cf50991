//! A seed-backed wallet over a shared UTXO store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use forge_store::{Utxo, UtxoStore};
use forge_transactions::{AuthorityKind, Transaction, UtxoRef};
use forge_types::{Address, Amount, Asset, NetworkId, ProtocolParams, TxHash};

use crate::addresses::{AddressBook, AddressWindow};
use crate::error::WalletError;
use crate::keys::KeyChain;
use crate::melt::{MeltBuilder, MeltError, MeltRequest, PendingMelt};
use crate::signer::TxSigner;

/// Index of the wallet's default receiving address.
pub const DEFAULT_ADDRESS_INDEX: u32 = 0;

/// Default number of unused addresses watched past the last used one.
pub const DEFAULT_ADDRESS_GAP: u32 = 20;

/// Available funds at one address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressInfo {
    pub address: Address,
    pub index: u32,
    pub token: Asset,
    pub total_amount_available: Amount,
    pub utxos: usize,
    pub authorities: usize,
}

pub struct Wallet {
    id: String,
    keychain: KeyChain,
    addresses: Mutex<AddressWindow>,
    store: Arc<dyn UtxoStore>,
    params: ProtocolParams,
    /// Counter for synthetic references given to directly credited outputs.
    next_credit: AtomicU64,
}

impl Wallet {
    pub fn new(
        id: impl Into<String>,
        keychain: KeyChain,
        address_gap: u32,
        store: Arc<dyn UtxoStore>,
        params: ProtocolParams,
    ) -> Self {
        let addresses = AddressWindow::new(&keychain, address_gap);
        Self {
            id: id.into(),
            keychain,
            addresses: Mutex::new(addresses),
            store,
            params,
            next_credit: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn store(&self) -> &Arc<dyn UtxoStore> {
        &self.store
    }

    fn window(&self) -> MutexGuard<'_, AddressWindow> {
        // The window holds no invariants a panicking writer could break.
        self.addresses.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn address_at(&self, index: u32) -> Address {
        self.keychain.address_at(index)
    }

    /// Build and sign a melt. Inputs stay reserved until `submit` or `abandon`.
    pub fn melt_tokens(&self, request: &MeltRequest) -> Result<PendingMelt, MeltError> {
        MeltBuilder::new(self.store.as_ref(), self, self, &self.params).build(request)
    }

    /// Spend a pending melt's inputs and index the outputs this wallet owns.
    ///
    /// Once the inputs are committed the spend is final: an output that
    /// cannot be indexed is logged and skipped rather than failing the call.
    pub fn submit(&self, pending: PendingMelt) -> Result<TxHash, WalletError> {
        let tx = &pending.transaction;
        let received = match self.owned_outputs(tx) {
            Ok(received) => received,
            Err(e) => {
                self.store.release(pending.reservation)?;
                return Err(e);
            }
        };
        let spent = self.store.commit(pending.reservation)?;

        let mut indexed = 0;
        for (index, utxo) in received {
            let id = utxo.id;
            match self.store.insert(utxo) {
                Ok(()) => {
                    self.window().mark_used(&self.keychain, index);
                    indexed += 1;
                }
                Err(e) => tracing::warn!(wallet = %self.id, utxo = %id, error = %e, "output not indexed"),
            }
        }
        tracing::info!(
            wallet = %self.id,
            tx = %tx.hash,
            spent = spent.len(),
            received = indexed,
            "transaction submitted"
        );
        Ok(tx.hash)
    }

    /// Drop a pending melt and return its inputs to the available pool.
    pub fn abandon(&self, pending: PendingMelt) -> Result<(), WalletError> {
        self.store.release(pending.reservation)?;
        tracing::debug!(wallet = %self.id, tx = %pending.transaction.hash, "pending melt abandoned");
        Ok(())
    }

    /// Index every output of `tx` locked to one of our addresses.
    pub fn ingest(&self, tx: &Transaction) -> Result<usize, WalletError> {
        let received = self.owned_outputs(tx)?;
        let count = received.len();
        for (index, utxo) in received {
            self.store.insert(utxo)?;
            self.window().mark_used(&self.keychain, index);
        }
        Ok(count)
    }

    /// Outputs of `tx` paying to this wallet, with their address indexes.
    fn owned_outputs(&self, tx: &Transaction) -> Result<Vec<(u32, Utxo)>, WalletError> {
        let network = self.keychain.network();
        let mut received = Vec::new();
        for (i, output) in tx.outputs.iter().enumerate() {
            let Some(address) = output.script.address(network) else {
                continue;
            };
            let Some(index) = self.owned_index(&address) else {
                continue;
            };
            let Some(asset) = tx.asset_of(output) else {
                continue;
            };
            let index_in_tx =
                u8::try_from(i).map_err(|_| WalletError::Transaction(too_many_outputs(tx)))?;
            received.push((
                index,
                Utxo {
                    id: UtxoRef::new(tx.hash, index_in_tx),
                    asset,
                    value: output.value,
                    address,
                    authority: output.authority(&self.params),
                },
            ));
        }
        Ok(received)
    }

    /// Credit an output to the address at `index` as if it had been received.
    ///
    /// `index` must fall inside the watched address window.
    pub fn fund(
        &self,
        index: u32,
        asset: Asset,
        value: Amount,
        authority: Option<AuthorityKind>,
    ) -> Result<UtxoRef, WalletError> {
        if self.window().address_at(index).is_none() {
            return Err(WalletError::UnknownAddressIndex(index));
        }
        let n = self.next_credit.fetch_add(1, Ordering::Relaxed);
        let hash = TxHash::new(forge_crypto::blake2b_256_multi(&[
            b"forge/credit",
            self.id.as_bytes(),
            &n.to_le_bytes(),
        ]));
        let id = UtxoRef::new(hash, 0);
        let address = self.address_at(index);
        self.store.insert(Utxo {
            id,
            asset,
            value,
            address,
            authority,
        })?;
        self.window().mark_used(&self.keychain, index);
        Ok(id)
    }

    /// Spendable balance of `asset`. Authorities and reserved outputs are excluded.
    pub fn balance(&self, asset: &Asset) -> Result<Amount, WalletError> {
        Ok(self.store.available_balance(asset)?)
    }

    /// Value of `asset` held by pending, not yet submitted transactions.
    pub fn locked_balance(&self, asset: &Asset) -> Result<Amount, WalletError> {
        Ok(self.store.reserved_balance(asset)?)
    }

    pub fn address_info(&self, index: u32, asset: &Asset) -> Result<AddressInfo, WalletError> {
        let address = self.address_at(index);
        let utxos = self.store.available_at(&address, asset)?;
        let (authorities, values): (Vec<_>, Vec<_>) = utxos.iter().partition(|u| u.is_authority());
        Ok(AddressInfo {
            total_amount_available: values.iter().map(|u| u.value).sum(),
            utxos: values.len(),
            authorities: authorities.len(),
            address,
            index,
            token: *asset,
        })
    }
}

fn too_many_outputs(tx: &Transaction) -> forge_transactions::TransactionError {
    forge_transactions::TransactionError::TooManyOutputs {
        count: tx.outputs.len(),
        max: u8::MAX as usize + 1,
    }
}

impl AddressBook for Wallet {
    fn network(&self) -> NetworkId {
        self.keychain.network()
    }

    fn owned_index(&self, address: &Address) -> Option<u32> {
        self.window().index_of(address)
    }

    fn default_receiving_address(&self) -> Address {
        self.address_at(DEFAULT_ADDRESS_INDEX)
    }

    fn allocate_change_address(&self, exclude: &[Address]) -> Address {
        let index = self
            .window()
            .next_unused(exclude)
            .unwrap_or(DEFAULT_ADDRESS_INDEX);
        self.address_at(index)
    }
}

impl TxSigner for Wallet {
    fn sign(&self, mut tx: Transaction, spent: &[Utxo]) -> Result<Transaction, WalletError> {
        if spent.len() != tx.inputs.len() {
            return Err(WalletError::Signing(format!(
                "{} inputs but {} spent outputs",
                tx.inputs.len(),
                spent.len()
            )));
        }
        let message = tx.signing_bytes()?;
        for (input, utxo) in tx.inputs.iter_mut().zip(spent) {
            let index = self
                .owned_index(&utxo.address)
                .ok_or_else(|| WalletError::AddressNotOwned(utxo.address.to_string()))?;
            let keys = self.keychain.keypair_at(index);
            input.signature = Some(forge_crypto::sign_message(&message, &keys.private));
            input.public_key = Some(keys.public);
        }
        Ok(tx)
    }
}
