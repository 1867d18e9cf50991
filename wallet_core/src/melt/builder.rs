//! Melt orchestration: validate, reserve, redeem, resolve, assemble, check, sign.
//!
//! Everything up to the reservation is side-effect free. From the moment
//! outputs are reserved a [`ReservationGuard`] owns them, and any early
//! return releases them again.

use forge_store::{ReservationId, ReservationRequest, StoreError, Utxo, UtxoStore};
use forge_transactions::validation::{validate_balance, validate_structure};
use forge_transactions::{AuthorityKind, OutputScript, SpentOutput, Transaction};
use forge_types::{Address, Amount, Asset, ProtocolParams, TokenId};

use super::assembler::{assemble, MeltPlan};
use super::authority::{resolve_authority_destination, AuthorityDecision, AuthorityDenial};
use super::error::{MeltError, ValidationError};
use super::redemption::redemption;
use super::request::{validate_request, MeltRequest, ValidatedRequest};
use crate::addresses::AddressBook;
use crate::signer::TxSigner;

/// Releases a reservation on drop unless disarmed.
pub struct ReservationGuard<'a> {
    store: &'a dyn UtxoStore,
    id: Option<ReservationId>,
}

impl<'a> ReservationGuard<'a> {
    pub fn new(store: &'a dyn UtxoStore, id: ReservationId) -> Self {
        Self { store, id: Some(id) }
    }

    /// Keep the reservation; the caller is now responsible for it.
    pub fn disarm(mut self) -> Option<ReservationId> {
        self.id.take()
    }
}

impl Drop for ReservationGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            match self.store.release(id) {
                Ok(()) => tracing::debug!(reservation = %id, "melt aborted, reservation released"),
                Err(e) => tracing::warn!(reservation = %id, error = %e, "failed to release reservation"),
            }
        }
    }
}

/// What a built melt does, for callers and responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeltSummary {
    pub token: TokenId,
    pub melted: Amount,
    pub redeemed: Amount,
    pub deposit_address: Address,
    pub change_address: Address,
    pub authority_address: Address,
    pub data_outputs: usize,
}

/// A signed melt whose inputs are still reserved.
///
/// Hand it to `Wallet::submit` to spend the inputs, or `Wallet::abandon` to
/// release them.
#[derive(Clone, Debug)]
pub struct PendingMelt {
    pub transaction: Transaction,
    pub reservation: ReservationId,
    pub summary: MeltSummary,
}

pub struct MeltBuilder<'a> {
    store: &'a dyn UtxoStore,
    book: &'a dyn AddressBook,
    signer: &'a dyn TxSigner,
    params: &'a ProtocolParams,
}

impl<'a> MeltBuilder<'a> {
    pub fn new(
        store: &'a dyn UtxoStore,
        book: &'a dyn AddressBook,
        signer: &'a dyn TxSigner,
        params: &'a ProtocolParams,
    ) -> Self {
        Self {
            store,
            book,
            signer,
            params,
        }
    }

    pub fn build(&self, request: &MeltRequest) -> Result<PendingMelt, MeltError> {
        let validated = validate_request(request, self.book, self.params)?;
        self.build_validated(validated)
    }

    pub fn build_validated(&self, req: ValidatedRequest) -> Result<PendingMelt, MeltError> {
        let token_asset = Asset::Token(req.token);
        let data_cost = self
            .params
            .data_output_value
            .checked_mul(req.data.len() as u64)
            .ok_or(MeltError::Validation(ValidationError::TooManyDataOutputs {
                count: req.data.len(),
                max: self.params.max_outputs,
            }))?;

        let reservation = self
            .store
            .reserve(
                &ReservationRequest::new()
                    .value(token_asset, req.amount)
                    .value(Asset::Native, data_cost)
                    .authority(req.token, AuthorityKind::Melt),
            )
            .map_err(|e| reservation_error(e, req.token))?;
        let guard = ReservationGuard::new(self.store, reservation.id);

        let redeemed = redemption(req.amount, self.params);

        let default_address = self.book.default_receiving_address();
        let authority_address = match resolve_authority_destination(
            req.melt_authority_address.as_ref(),
            req.authority_ownership,
            req.allow_external_melt_authority_address,
            &default_address,
        ) {
            AuthorityDecision::Allowed(address) => address,
            AuthorityDecision::Denied(AuthorityDenial::ExternalNotAllowed(address)) => {
                return Err(MeltError::ExternalAuthorityNotAllowed(address));
            }
            AuthorityDecision::Denied(AuthorityDenial::InvalidAddress(address)) => {
                return Err(MeltError::InvalidAuthorityAddress(address.to_string()));
            }
        };

        let deposit_address = req
            .deposit_address
            .clone()
            .unwrap_or_else(|| default_address.clone());
        let change_address = match &req.change_address {
            Some(address) => address.clone(),
            None => self
                .book
                .allocate_change_address(&[deposit_address.clone(), authority_address.clone()]),
        };

        let token_selection = reservation.selection(&token_asset);
        let native_selection = reservation.selection(&Asset::Native);
        let authority_utxo = reservation
            .authority(&req.token, AuthorityKind::Melt)
            .ok_or(MeltError::AuthorityUnavailable(req.token))?;

        let spent: Vec<Utxo> = token_selection
            .into_iter()
            .chain(native_selection)
            .flat_map(|s| s.utxos.iter().cloned())
            .chain(std::iter::once(authority_utxo.clone()))
            .collect();

        let network = self.book.network();
        let plan = MeltPlan {
            token: req.token,
            inputs: spent.iter().map(|u| u.id).collect(),
            redemption: redeemed,
            deposit: OutputScript::pay_to(&deposit_address, network)
                .ok_or_else(|| ValidationError::InvalidAddress(deposit_address.to_string()))?,
            token_change: token_selection.map_or(Amount::ZERO, |s| s.surplus(req.amount)),
            native_change: native_selection.map_or(Amount::ZERO, |s| s.surplus(data_cost)),
            change: OutputScript::pay_to(&change_address, network)
                .ok_or_else(|| ValidationError::ChangeAddressNotOwned(change_address.to_string()))?,
            authority: OutputScript::pay_to(&authority_address, network)
                .ok_or_else(|| MeltError::InvalidAuthorityAddress(authority_address.to_string()))?,
            data: req.data.clone(),
            unshift_data: req.unshift_data,
        };

        let tx = assemble(&plan, self.params);
        let prev: Vec<SpentOutput> = spent.iter().map(Utxo::to_spent_output).collect();
        validate_structure(&tx, self.params)?;
        let balance = validate_balance(&tx, &prev, self.params)?;

        let mut tx = self.signer.sign(tx, &spent)?;
        tx.seal()?;

        tracing::info!(
            tx = %tx.hash,
            token = %req.token,
            melted = %req.amount,
            redeemed = %balance.redeemed,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            "melt transaction built"
        );

        let reservation = guard.disarm().unwrap_or(reservation.id);
        Ok(PendingMelt {
            transaction: tx,
            reservation,
            summary: MeltSummary {
                token: req.token,
                melted: req.amount,
                redeemed: balance.redeemed,
                deposit_address,
                change_address,
                authority_address,
                data_outputs: req.data.len(),
            },
        })
    }
}

fn reservation_error(e: StoreError, token: TokenId) -> MeltError {
    match e {
        StoreError::InsufficientFunds {
            asset: Asset::Token(_),
            needed,
            available,
        } => MeltError::InsufficientFunds {
            requested: needed,
            available,
        },
        StoreError::InsufficientFunds {
            asset: Asset::Native,
            needed,
            available,
        } => MeltError::InsufficientNativeForData { needed, available },
        StoreError::AuthorityNotFound { .. } => MeltError::AuthorityUnavailable(token),
        other => MeltError::Store(other),
    }
}
