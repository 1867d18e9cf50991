use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use forge_rpc::{router, WalletRegistry};
use forge_store_mem::MemUtxoStore;
use forge_transactions::{AuthorityKind, OutputScript};
use forge_types::{Amount, Asset, NetworkId, ProtocolParams, TokenId};
use forge_wallet_core::{KeyChain, Wallet};
use serde_json::{json, Value};
use tower::ServiceExt;

const WALLET_ID: &str = "melt-token-1";
const NET: NetworkId = NetworkId::Test;

fn token() -> TokenId {
    TokenId::new([0xc3; 32])
}

/// 10 native and 1000 tokens at index 0, plus the melt authority.
fn setup() -> (Router, Arc<Wallet>) {
    let registry = Arc::new(WalletRegistry::new());
    let wallet = registry.insert(Wallet::new(
        WALLET_ID,
        KeyChain::new([0x10; 32], NET),
        20,
        Arc::new(MemUtxoStore::new()),
        ProtocolParams::default(),
    ));
    wallet.fund(0, Asset::Native, Amount::new(10), None).unwrap();
    wallet.fund(0, Asset::Token(token()), Amount::new(1000), None).unwrap();
    wallet
        .fund(0, Asset::Token(token()), Amount::new(2), Some(AuthorityKind::Melt))
        .unwrap();
    (router(registry), wallet)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn melt(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/wallet/melt-tokens")
        .header("content-type", "application/json")
        .header("x-wallet-id", WALLET_ID)
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, text) = send(app, request).await;
    (status, serde_json::from_str(&text).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header("x-wallet-id", WALLET_ID)
        .body(Body::empty())
        .unwrap();
    let (status, text) = send(app, request).await;
    (status, serde_json::from_str(&text).unwrap())
}

async fn balance(app: &Router, token: Option<&TokenId>) -> u64 {
    let uri = match token {
        Some(t) => format!("/wallet/balance?token={}", t.to_hex()),
        None => "/wallet/balance".to_string(),
    };
    let (status, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    body["available"].as_u64().unwrap()
}

#[tokio::test]
async fn missing_and_unknown_wallet_id() {
    let (app, _) = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/wallet/melt-tokens")
        .header("content-type", "application/json")
        .body(Body::from(json!({"token": token().to_hex(), "amount": 100}).to_string()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .uri("/wallet/balance")
        .header("x-wallet-id", "who")
        .body(Body::empty())
        .unwrap();
    let (status, text) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid wallet-id parameter.");
}

#[tokio::test]
async fn rejects_invalid_requests() {
    let (app, _) = setup();

    let (status, body) = melt(&app, json!({"token": "invalidToken", "amount": 100})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (status, body) = melt(&app, json!({"token": token().to_hex(), "amount": "invalidAmount"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.to_string().contains("invalid"));

    for amount in [json!(0), json!(-1)] {
        let (status, body) = melt(&app, json!({"token": token().to_hex(), "amount": amount})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body.to_string().contains("amount"));
    }

    let (status, body) = melt(
        &app,
        json!({"token": token().to_hex(), "amount": 200, "deposit_address": "invalidAddress"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body.to_string().contains("Invalid"));

    let foreign = KeyChain::new([0x77; 32], NET).address_at(4);
    for change in [json!("invalidAddress"), json!(foreign.as_str())] {
        let (status, body) = melt(
            &app,
            json!({"token": token().to_hex(), "amount": 200, "change_address": change}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Change address is not from this wallet"));
    }

    let (status, body) = melt(
        &app,
        json!({"token": token().to_hex(), "amount": 1100, "address": "ignored"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    assert_eq!(balance(&app, None).await, 10);
    assert_eq!(balance(&app, Some(&token())).await, 1000);
}

#[tokio::test]
async fn insufficient_tokens() {
    let (app, wallet) = setup();
    let (status, body) = melt(
        &app,
        json!({
            "token": token().to_hex(),
            "address": wallet.address_at(1).as_str(),
            "amount": 1100
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("enough tokens to melt"));
    assert_eq!(balance(&app, Some(&token())).await, 1000);
}

#[tokio::test]
async fn melt_sequence_tracks_balances() {
    let (app, wallet) = setup();
    let tka = token().to_hex();

    let (_, body) = melt(
        &app,
        json!({
            "token": tka,
            "amount": 300,
            "deposit_address": wallet.address_at(3).as_str(),
            "change_address": wallet.address_at(4).as_str(),
        }),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["hash"].as_str().unwrap().len(), 64);

    let (_, info) = get(&app, "/wallet/address-info?index=3").await;
    assert_eq!(info["total_amount_available"], 3);
    let (_, info) = get(&app, &format!("/wallet/address-info?index=3&token={tka}")).await;
    assert_eq!(info["total_amount_available"], 0);
    let (_, info) = get(&app, "/wallet/address-info?index=4").await;
    assert_eq!(info["total_amount_available"], 0);
    let (_, info) = get(&app, &format!("/wallet/address-info?index=4&token={tka}")).await;
    assert_eq!(info["total_amount_available"], 700);
    assert_eq!(balance(&app, None).await, 13);
    assert_eq!(balance(&app, Some(&token())).await, 700);

    let (_, body) = melt(
        &app,
        json!({"token": tka, "amount": 100, "deposit_address": wallet.address_at(6).as_str()}),
    )
    .await;
    assert_eq!(body["success"], true);
    let (_, info) = get(&app, "/wallet/address-info?index=6").await;
    assert_eq!(info["total_amount_available"], 1);

    let (_, body) = melt(
        &app,
        json!({"token": tka, "amount": 100, "change_address": wallet.address_at(8).as_str()}),
    )
    .await;
    assert_eq!(body["success"], true);
    let (_, info) = get(&app, &format!("/wallet/address-info?index=8&token={tka}")).await;
    assert_eq!(info["total_amount_available"], 500);

    let (_, body) = melt(&app, json!({"token": tka, "amount": 100})).await;
    assert_eq!(body["success"], true);
    assert_eq!(balance(&app, None).await, 16);
    assert_eq!(balance(&app, Some(&token())).await, 400);

    let (_, body) = melt(&app, json!({"token": tka, "amount": 50})).await;
    assert_eq!(body["success"], true);
    assert_eq!(balance(&app, None).await, 16);
    assert_eq!(balance(&app, Some(&token())).await, 350);

    let (_, body) = melt(
        &app,
        json!({"token": tka, "address": wallet.address_at(1).as_str(), "amount": "110"}),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(balance(&app, None).await, 17);
    assert_eq!(balance(&app, Some(&token())).await, 240);
}

#[tokio::test]
async fn authority_and_data_outputs() {
    let (app, wallet) = setup();
    let tka = token().to_hex();

    let (_, body) = melt(
        &app,
        json!({
            "token": tka,
            "address": wallet.address_at(16).as_str(),
            "melt_authority_address": wallet.address_at(0).as_str(),
            "amount": 20
        }),
    )
    .await;
    assert_eq!(body["success"], true);
    let authorities: Vec<&Value> = body["outputs"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|o| o["tokenData"].as_u64().unwrap() & 0x80 != 0)
        .collect();
    assert_eq!(authorities.len(), 1);
    assert_eq!(authorities[0]["value"], 2);
    assert_eq!(authorities[0]["decoded"]["address"], wallet.address_at(0).as_str());

    let (_, body) = melt(&app, json!({"token": tka, "amount": 10, "data": ["foobar1", "foobar2"]})).await;
    assert_eq!(body["success"], true);
    let outputs = body["outputs"].as_array().unwrap();
    let script1 = OutputScript::data(b"foobar1".to_vec()).to_bytes();
    let script2 = OutputScript::data(b"foobar2".to_vec()).to_bytes();
    assert_eq!(outputs[1]["script"]["data"], json!(script1));
    assert_eq!(outputs[0]["script"]["data"], json!(script2));
    for out in &outputs[..2] {
        assert_eq!(out["token_data"], 0);
        assert_eq!(out["value"], 1);
    }
    assert_eq!(balance(&app, None).await, 8);

    let (_, body) = melt(
        &app,
        json!({"token": tka, "amount": 10, "data": ["foobar"], "unshift_data": false}),
    )
    .await;
    assert_eq!(body["success"], true);
    let last = body["outputs"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["script"]["data"], json!(OutputScript::data(b"foobar".to_vec()).to_bytes()));
    assert_eq!(last["value"], 1);
    assert_eq!(balance(&app, None).await, 7);
}

#[tokio::test]
async fn external_authority_needs_flag() {
    let (app, wallet) = setup();
    let external = KeyChain::new([0x55; 32], NET).address_at(0);
    let request = json!({
        "token": token().to_hex(),
        "address": wallet.address_at(17).as_str(),
        "melt_authority_address": external.as_str(),
        "amount": 1000,
    });

    let (status, body) = melt(&app, request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let mut allowed = request;
    allowed["allow_external_melt_authority_address"] = json!(true);
    let (_, body) = melt(&app, allowed).await;
    assert_eq!(body["success"], true);
    let authority = body["outputs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["tokenData"].as_u64().unwrap() & 0x80 != 0)
        .unwrap()
        .clone();
    assert_eq!(authority["decoded"]["address"], external.as_str());
    assert_eq!(balance(&app, None).await, 20);
    assert_eq!(balance(&app, Some(&token())).await, 0);
}

#[tokio::test]
async fn address_endpoints() {
    let (app, wallet) = setup();
    let (status, body) = get(&app, "/wallet/address").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], wallet.address_at(0).as_str());

    let (_, body) = get(&app, "/wallet/address?index=5").await;
    assert_eq!(body["address"], wallet.address_at(5).as_str());

    let (_, body) = get(
        &app,
        &format!("/wallet/address-info?address={}&token={}", wallet.address_at(0), token().to_hex()),
    )
    .await;
    assert_eq!(body["index"], 0);
    assert_eq!(body["total_amount_available"], 1000);
    assert_eq!(body["authorities"], 1);

    let (status, _) = get(&app, "/wallet/address-info").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
