use std::sync::Arc;

use forge_store_mem::MemUtxoStore;
use forge_transactions::AuthorityKind;
use forge_types::{Amount, Asset, NetworkId, ProtocolParams, TokenId};
use forge_wallet_core::{KeyChain, MeltRequest, Wallet};
use proptest::prelude::*;

fn token() -> TokenId {
    TokenId::new([0x31; 32])
}

fn wallet(holdings: &[u64]) -> Wallet {
    let wallet = Wallet::new(
        "props",
        KeyChain::new([0x31; 32], NetworkId::Dev),
        20,
        Arc::new(MemUtxoStore::new()),
        ProtocolParams::default(),
    );
    wallet.fund(0, Asset::Native, Amount::new(50), None).unwrap();
    for (i, v) in holdings.iter().enumerate() {
        wallet
            .fund((i % 5) as u32, Asset::Token(token()), Amount::new(*v), None)
            .unwrap();
    }
    wallet
        .fund(0, Asset::Token(token()), Amount::new(2), Some(AuthorityKind::Melt))
        .unwrap();
    wallet
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Redeemed native equals floor(amount / 100) and token balance drops by amount.
    #[test]
    fn melt_conserves_value(
        holdings in prop::collection::vec(1u64..5_000, 1..8),
        pick in any::<prop::sample::Index>(),
        data in 0usize..4,
    ) {
        let total: u64 = holdings.iter().sum();
        let amount = pick.index(total as usize) as u64 + 1;
        let w = wallet(&holdings);
        let entries: Vec<String> = (0..data).map(|i| format!("entry-{i}")).collect();

        let pending = w
            .melt_tokens(&MeltRequest::new(token(), amount).data(entries))
            .unwrap();
        prop_assert_eq!(pending.summary.redeemed.raw(), amount / 100);
        prop_assert_eq!(
            pending.transaction.outputs.iter().filter(|o| o.token_data.is_authority()).count(),
            1
        );
        prop_assert_eq!(
            pending.transaction.outputs.iter().filter(|o| o.script.is_data()).count(),
            data
        );
        w.submit(pending).unwrap();

        let token_after = w.balance(&Asset::Token(token())).unwrap().raw();
        let native_after = w.balance(&Asset::Native).unwrap().raw();
        prop_assert_eq!(token_after, total - amount);
        prop_assert_eq!(native_after, 50 + amount / 100 - data as u64);
    }

    /// Asking for more than is held never changes balances.
    #[test]
    fn overdraw_is_side_effect_free(holdings in prop::collection::vec(1u64..5_000, 1..8), extra in 1u64..1000) {
        let total: u64 = holdings.iter().sum();
        let w = wallet(&holdings);
        prop_assert!(w.melt_tokens(&MeltRequest::new(token(), total + extra)).is_err());
        prop_assert_eq!(w.balance(&Asset::Token(token())).unwrap().raw(), total);
        prop_assert_eq!(w.balance(&Asset::Native).unwrap().raw(), 50);
    }
}
