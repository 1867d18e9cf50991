//! HTTP handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use forge_transactions::{OutputScript, Transaction, TxOutput};
use forge_types::{Asset, NetworkId, TokenId};
use forge_utils::tracing_spans::{melt_span, rpc_span, submit_span};
use forge_wallet_core::{AddressBook, MeltRequest, Wallet, WalletError};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::registry::WalletRegistry;

pub const WALLET_ID_HEADER: &str = "x-wallet-id";

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WalletRegistry>,
}

fn wallet_from(state: &AppState, headers: &HeaderMap) -> Result<Arc<Wallet>, RpcError> {
    let id = headers
        .get(WALLET_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RpcError::MissingWalletId)?;
    state
        .registry
        .get(id)
        .ok_or_else(|| RpcError::UnknownWallet(id.to_string()))
}

/// Absent or `"native"` selects the native currency; anything else must be a token id.
fn parse_asset(token: Option<&str>) -> Result<Asset, RpcError> {
    match token.map(str::trim) {
        None | Some("") | Some("native") => Ok(Asset::Native),
        Some(s) => s
            .parse::<TokenId>()
            .map(Asset::Token)
            .map_err(|_| RpcError::InvalidToken(s.to_string())),
    }
}

// ── Melt ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptView {
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecodedView {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputView {
    pub value: u64,
    pub token_data: u8,
    /// Same as `token_data`, for clients that read the camel-case name.
    #[serde(rename = "tokenData")]
    pub token_data_camel: u8,
    pub script: ScriptView,
    pub decoded: DecodedView,
}

impl OutputView {
    fn new(output: &TxOutput, network: NetworkId) -> Self {
        let decoded = match &output.script {
            OutputScript::P2pkh { .. } => DecodedView {
                kind: "P2PKH".into(),
                address: output.script.address(network).map(|a| a.to_string()),
            },
            OutputScript::Data(_) => DecodedView {
                kind: "data".into(),
                address: None,
            },
        };
        Self {
            value: output.value.raw(),
            token_data: output.token_data.0,
            token_data_camel: output.token_data.0,
            script: ScriptView {
                data: output.script.to_bytes(),
            },
            decoded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputView {
    pub tx_id: String,
    pub index: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeltResponse {
    pub success: bool,
    pub hash: String,
    pub inputs: Vec<InputView>,
    pub outputs: Vec<OutputView>,
    pub tokens: Vec<String>,
}

impl MeltResponse {
    fn new(tx: &Transaction, network: NetworkId) -> Self {
        Self {
            success: true,
            hash: tx.hash.to_hex(),
            inputs: tx
                .inputs
                .iter()
                .map(|i| InputView {
                    tx_id: i.utxo.tx_hash.to_hex(),
                    index: i.utxo.index,
                })
                .collect(),
            outputs: tx.outputs.iter().map(|o| OutputView::new(o, network)).collect(),
            tokens: tx.tokens.iter().map(TokenId::to_hex).collect(),
        }
    }
}

pub async fn melt_tokens(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<MeltRequest>, JsonRejection>,
) -> Result<Json<MeltResponse>, RpcError> {
    let wallet = wallet_from(&state, &headers)?;
    let Json(request) = payload.map_err(|e| RpcError::BadRequest(e.body_text()))?;

    rpc_span("melt-tokens", wallet.id()).in_scope(|| -> Result<Json<MeltResponse>, RpcError> {
        let pending = melt_span(wallet.id(), &request.token)
            .in_scope(|| wallet.melt_tokens(&request))
            .map_err(|e| {
                tracing::warn!(error = %e, "melt rejected");
                RpcError::Melt(e)
            })?;

        let tx = pending.transaction.clone();
        submit_span(wallet.id(), &tx.hash.to_hex()).in_scope(|| wallet.submit(pending))?;
        Ok(Json(MeltResponse::new(&tx, wallet.network())))
    })
}

// ── Balance ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub token: String,
    pub available: u64,
    pub locked: u64,
}

pub async fn balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, RpcError> {
    let wallet = wallet_from(&state, &headers)?;
    let Query(query) = query.map_err(|e| RpcError::BadRequest(e.body_text()))?;
    let asset = parse_asset(query.token.as_deref())?;
    Ok(Json(BalanceResponse {
        success: true,
        token: asset.to_string(),
        available: wallet.balance(&asset)?.raw(),
        locked: wallet.locked_balance(&asset)?.raw(),
    }))
}

// ── Addresses ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub index: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    pub success: bool,
    pub address: String,
    pub index: u32,
}

pub async fn address(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Json<AddressResponse>, RpcError> {
    let wallet = wallet_from(&state, &headers)?;
    let Query(query) = query.map_err(|e| RpcError::BadRequest(e.body_text()))?;
    let index = query.index.unwrap_or(forge_wallet_core::DEFAULT_ADDRESS_INDEX);
    Ok(Json(AddressResponse {
        success: true,
        address: wallet.address_at(index).to_string(),
        index,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddressInfoQuery {
    pub index: Option<u32>,
    pub address: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressInfoResponse {
    pub success: bool,
    pub address: String,
    pub index: u32,
    pub token: String,
    pub total_amount_available: u64,
    pub utxos: usize,
    pub authorities: usize,
}

pub async fn address_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<AddressInfoQuery>, QueryRejection>,
) -> Result<Json<AddressInfoResponse>, RpcError> {
    let wallet = wallet_from(&state, &headers)?;
    let Query(query) = query.map_err(|e| RpcError::BadRequest(e.body_text()))?;
    let asset = parse_asset(query.token.as_deref())?;

    let index = match (query.index, query.address.as_deref()) {
        (Some(index), _) => index,
        (None, Some(address)) => wallet
            .owned_index(&address.into())
            .ok_or_else(|| WalletError::AddressNotOwned(address.to_string()))?,
        (None, None) => {
            return Err(RpcError::BadRequest(
                "either 'index' or 'address' is required".into(),
            ))
        }
    };

    let info = wallet.address_info(index, &asset)?;
    Ok(Json(AddressInfoResponse {
        success: true,
        address: info.address.to_string(),
        index: info.index,
        token: info.token.to_string(),
        total_amount_available: info.total_amount_available.raw(),
        utxos: info.utxos,
        authorities: info.authorities,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub wallets: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        wallets: state.registry.len(),
    })
}
