//! Melting custom tokens back into native currency.
//!
//! The pipeline is split so each stage can be tested alone:
//! [`request`] validation, [`redemption`] arithmetic, [`authority`]
//! destination, [`assembler`] output layout and the [`builder`] that drives
//! them against a UTXO store.

pub mod assembler;
pub mod authority;
pub mod builder;
pub mod error;
pub mod redemption;
pub mod request;

pub use assembler::{assemble, place_data_outputs, MeltPlan};
pub use authority::{resolve_authority_destination, AddressOwnership, AuthorityDecision, AuthorityDenial};
pub use builder::{MeltBuilder, MeltSummary, PendingMelt, ReservationGuard};
pub use error::{MeltError, ValidationError};
pub use redemption::redemption;
pub use request::{parse_amount, validate_request, MeltRequest, ValidatedRequest};
