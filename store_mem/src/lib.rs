//! In-memory UTXO index.
//!
//! All state sits behind one mutex, so a reservation's select-and-mark step
//! is a single critical section. Outputs keep insertion order, which makes
//! authority selection and selection ties deterministic.

pub mod selection;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use forge_store::{
    Reservation, ReservationId, ReservationRequest, Selection, StoreError, Utxo, UtxoStatus,
    UtxoStore,
};
use forge_transactions::UtxoRef;
use forge_types::{Address, Amount, Asset};

struct Entry {
    utxo: Utxo,
    status: UtxoStatus,
}

#[derive(Default)]
struct Arena {
    entries: Vec<Entry>,
    index: HashMap<UtxoRef, usize>,
    /// Arena slots held by each open reservation.
    reservations: HashMap<ReservationId, Vec<usize>>,
}

impl Arena {
    fn available(&self) -> impl Iterator<Item = (usize, &Utxo)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.status == UtxoStatus::Available)
            .map(|(i, e)| (i, &e.utxo))
    }

    fn balance(&self, asset: &Asset) -> Amount {
        self.available()
            .filter(|(_, u)| u.holds(asset))
            .map(|(_, u)| u.value)
            .sum()
    }

    fn entry(&self, utxo: &UtxoRef) -> Result<&Entry, StoreError> {
        self.index
            .get(utxo)
            .map(|&slot| &self.entries[slot])
            .ok_or(StoreError::NotFound(*utxo))
    }
}

pub struct MemUtxoStore {
    arena: Mutex<Arena>,
    next_reservation: AtomicU64,
}

impl MemUtxoStore {
    pub fn new() -> Self {
        Self {
            arena: Mutex::new(Arena::default()),
            next_reservation: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Arena>, StoreError> {
        self.arena
            .lock()
            .map_err(|_| StoreError::Backend("utxo arena lock poisoned".into()))
    }

    /// Number of open reservations.
    pub fn open_reservations(&self) -> usize {
        self.lock().map(|a| a.reservations.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|a| a.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemUtxoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UtxoStore for MemUtxoStore {
    fn insert(&self, utxo: Utxo) -> Result<(), StoreError> {
        let mut arena = self.lock()?;
        if arena.index.contains_key(&utxo.id) {
            return Err(StoreError::Duplicate(utxo.id));
        }
        let slot = arena.entries.len();
        arena.index.insert(utxo.id, slot);
        arena.entries.push(Entry {
            utxo,
            status: UtxoStatus::Available,
        });
        Ok(())
    }

    fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, StoreError> {
        let mut arena = self.lock()?;
        let id = ReservationId(self.next_reservation.fetch_add(1, Ordering::Relaxed));

        // Pick everything first; nothing is marked until every part succeeds.
        let mut taken: Vec<usize> = Vec::new();
        let mut values = Vec::with_capacity(request.values.len());
        for (asset, needed) in &request.values {
            let candidates: Vec<(usize, Amount)> = arena
                .available()
                .filter(|(slot, u)| u.holds(asset) && !taken.contains(slot))
                .map(|(slot, u)| (slot, u.value))
                .collect();
            let amounts: Vec<Amount> = candidates.iter().map(|(_, v)| *v).collect();
            let picked = selection::select(&amounts, *needed).ok_or_else(|| {
                StoreError::InsufficientFunds {
                    asset: *asset,
                    needed: *needed,
                    available: amounts.iter().copied().sum(),
                }
            })?;

            let slots: Vec<usize> = picked.iter().map(|&i| candidates[i].0).collect();
            let utxos: Vec<Utxo> = slots.iter().map(|&s| arena.entries[s].utxo.clone()).collect();
            let total = utxos.iter().map(|u| u.value).sum();
            taken.extend(slots);
            values.push(Selection {
                asset: *asset,
                utxos,
                total,
            });
        }

        let mut authorities = Vec::with_capacity(request.authorities.len());
        for (token, kind) in &request.authorities {
            let asset = Asset::Token(*token);
            let (slot, utxo) = arena
                .available()
                .find(|(slot, u)| u.grants(&asset, *kind) && !taken.contains(slot))
                .ok_or(StoreError::AuthorityNotFound {
                    token: *token,
                    kind: *kind,
                })?;
            authorities.push(utxo.clone());
            taken.push(slot);
        }

        for &slot in &taken {
            arena.entries[slot].status = UtxoStatus::Reserved(id);
        }
        arena.reservations.insert(id, taken);
        tracing::debug!(reservation = %id, "utxos reserved");

        Ok(Reservation {
            id,
            values,
            authorities,
        })
    }

    fn release(&self, id: ReservationId) -> Result<(), StoreError> {
        let mut arena = self.lock()?;
        let slots = arena
            .reservations
            .remove(&id)
            .ok_or(StoreError::UnknownReservation(id))?;
        for slot in slots {
            arena.entries[slot].status = UtxoStatus::Available;
        }
        tracing::debug!(reservation = %id, "reservation released");
        Ok(())
    }

    fn commit(&self, id: ReservationId) -> Result<Vec<UtxoRef>, StoreError> {
        let mut arena = self.lock()?;
        let slots = arena
            .reservations
            .remove(&id)
            .ok_or(StoreError::UnknownReservation(id))?;
        let mut spent = Vec::with_capacity(slots.len());
        for slot in slots {
            let entry = &mut arena.entries[slot];
            entry.status = UtxoStatus::Spent;
            spent.push(entry.utxo.id);
        }
        tracing::debug!(reservation = %id, spent = spent.len(), "reservation committed");
        Ok(spent)
    }

    fn status(&self, utxo: &UtxoRef) -> Result<UtxoStatus, StoreError> {
        Ok(self.lock()?.entry(utxo)?.status)
    }

    fn get(&self, utxo: &UtxoRef) -> Result<Utxo, StoreError> {
        Ok(self.lock()?.entry(utxo)?.utxo.clone())
    }

    fn available_balance(&self, asset: &Asset) -> Result<Amount, StoreError> {
        Ok(self.lock()?.balance(asset))
    }

    fn reserved_balance(&self, asset: &Asset) -> Result<Amount, StoreError> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .filter(|e| matches!(e.status, UtxoStatus::Reserved(_)) && e.utxo.holds(asset))
            .map(|e| e.utxo.value)
            .sum())
    }

    fn available_at(&self, address: &Address, asset: &Asset) -> Result<Vec<Utxo>, StoreError> {
        Ok(self
            .lock()?
            .available()
            .filter(|(_, u)| &u.address == address && &u.asset == asset)
            .map(|(_, u)| u.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_transactions::AuthorityKind;
    use forge_types::{TokenId, TxHash};

    fn token() -> TokenId {
        TokenId::new([0x11; 32])
    }

    fn utxo(n: u8, asset: Asset, value: u64, authority: Option<AuthorityKind>) -> Utxo {
        Utxo {
            id: UtxoRef::new(TxHash::new([n; 32]), 0),
            asset,
            value: Amount::new(value),
            address: Address::new("owner"),
            authority,
        }
    }

    fn seeded() -> MemUtxoStore {
        let store = MemUtxoStore::new();
        store.insert(utxo(1, Asset::Token(token()), 300, None)).unwrap();
        store.insert(utxo(2, Asset::Token(token()), 700, None)).unwrap();
        store
            .insert(utxo(3, Asset::Token(token()), 2, Some(AuthorityKind::Melt)))
            .unwrap();
        store.insert(utxo(4, Asset::Native, 50, None)).unwrap();
        store
    }

    #[test]
    fn duplicate_insert_rejected() {
        let store = seeded();
        let err = store
            .insert(utxo(1, Asset::Native, 1, None))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn authorities_do_not_count_toward_balance() {
        let store = seeded();
        assert_eq!(
            store.available_balance(&Asset::Token(token())).unwrap(),
            Amount::new(1000)
        );
    }

    #[test]
    fn reserve_marks_and_release_restores() {
        let store = seeded();
        let req = ReservationRequest::new()
            .value(Asset::Token(token()), Amount::new(500))
            .authority(token(), AuthorityKind::Melt);
        let res = store.reserve(&req).unwrap();

        let sel = res.selection(&Asset::Token(token())).unwrap();
        assert_eq!(sel.total, Amount::new(700));
        assert_eq!(sel.surplus(Amount::new(500)), Amount::new(200));
        assert!(res.authority(&token(), AuthorityKind::Melt).is_some());
        for u in res.utxos() {
            assert_eq!(store.status(&u.id).unwrap(), UtxoStatus::Reserved(res.id));
        }
        assert_eq!(
            store.available_balance(&Asset::Token(token())).unwrap(),
            Amount::new(300)
        );
        assert_eq!(
            store.reserved_balance(&Asset::Token(token())).unwrap(),
            Amount::new(700)
        );

        store.release(res.id).unwrap();
        assert_eq!(store.reserved_balance(&Asset::Token(token())).unwrap(), Amount::ZERO);
        assert_eq!(
            store.available_balance(&Asset::Token(token())).unwrap(),
            Amount::new(1000)
        );
        assert_eq!(store.open_reservations(), 0);
    }

    #[test]
    fn failed_reservation_marks_nothing() {
        let store = seeded();
        let req = ReservationRequest::new()
            .value(Asset::Token(token()), Amount::new(500))
            .authority(token(), AuthorityKind::Mint);
        let err = store.reserve(&req).unwrap_err();
        assert!(matches!(err, StoreError::AuthorityNotFound { .. }));
        assert_eq!(
            store.available_balance(&Asset::Token(token())).unwrap(),
            Amount::new(1000)
        );
        assert_eq!(store.open_reservations(), 0);
    }

    #[test]
    fn insufficient_reports_available() {
        let store = seeded();
        let req = ReservationRequest::new().value(Asset::Token(token()), Amount::new(1001));
        match store.reserve(&req).unwrap_err() {
            StoreError::InsufficientFunds {
                needed, available, ..
            } => {
                assert_eq!(needed, Amount::new(1001));
                assert_eq!(available, Amount::new(1000));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn commit_spends() {
        let store = seeded();
        let req = ReservationRequest::new().value(Asset::Native, Amount::new(10));
        let res = store.reserve(&req).unwrap();
        let spent = store.commit(res.id).unwrap();
        assert_eq!(spent.len(), 1);
        assert_eq!(store.status(&spent[0]).unwrap(), UtxoStatus::Spent);
        assert!(matches!(
            store.release(res.id),
            Err(StoreError::UnknownReservation(_))
        ));
    }

    #[test]
    fn available_at_filters_by_address_and_asset() {
        let store = seeded();
        let found = store
            .available_at(&Address::new("owner"), &Asset::Token(token()))
            .unwrap();
        assert_eq!(found.len(), 3);
        assert!(store
            .available_at(&Address::new("someone-else"), &Asset::Native)
            .unwrap()
            .is_empty());
    }
}
