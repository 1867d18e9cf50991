//! UTXO index traits for the Forge wallet engine.
//!
//! Backends (in-memory for tests and the daemon, persistent ones later)
//! implement [`UtxoStore`]. Builders depend only on the trait.
//!
//! A store is the single point of coordination between concurrent
//! transaction builders: `reserve` must select and mark outputs in one
//! atomic step, so two callers can never be handed the same output.

pub mod error;
pub mod reservation;
pub mod utxo;

pub use error::StoreError;
pub use reservation::{Reservation, ReservationId, ReservationRequest, Selection};
pub use utxo::{Utxo, UtxoStatus};

use forge_transactions::UtxoRef;
use forge_types::{Address, Amount, Asset};

pub trait UtxoStore: Send + Sync {
    /// Index a newly received output as available.
    fn insert(&self, utxo: Utxo) -> Result<(), StoreError>;

    /// Select and mark everything `request` asks for, or nothing at all.
    fn reserve(&self, request: &ReservationRequest) -> Result<Reservation, StoreError>;

    /// Return a reservation's outputs to the available pool.
    fn release(&self, id: ReservationId) -> Result<(), StoreError>;

    /// Mark a reservation's outputs as spent. Returns the spent references.
    fn commit(&self, id: ReservationId) -> Result<Vec<UtxoRef>, StoreError>;

    fn status(&self, utxo: &UtxoRef) -> Result<UtxoStatus, StoreError>;

    fn get(&self, utxo: &UtxoRef) -> Result<Utxo, StoreError>;

    /// Sum of available, non-authority outputs of `asset`.
    fn available_balance(&self, asset: &Asset) -> Result<Amount, StoreError>;

    /// Sum of non-authority outputs of `asset` held by open reservations.
    fn reserved_balance(&self, asset: &Asset) -> Result<Amount, StoreError>;

    /// Available outputs of `asset` (authorities included) locked to `address`.
    fn available_at(&self, address: &Address, asset: &Asset) -> Result<Vec<Utxo>, StoreError>;
}
