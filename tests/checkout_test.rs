mod common;

use common::{FailingGateway, apples, dump, instant_gateway, milk, open_shop};
use rust_decimal_macros::dec;
use std::sync::Arc;
use superpay::application::shop::{Shop, ShopConfig};
use superpay::domain::checkout::{CheckoutState, FailureReason, GatewayError};
use superpay::domain::money::Balance;
use superpay::domain::ports::MockPaymentGateway;
use superpay::domain::transaction::TransactionType;
use superpay::infrastructure::in_memory::InMemoryStore;

#[tokio::test]
async fn test_successful_checkout_commits_everything() {
    let store = InMemoryStore::new();
    let shop = open_shop(Arc::new(store.clone()), instant_gateway()).await;

    shop.cart().add(&apples()).await;
    shop.cart().add(&apples()).await;
    shop.cart().add(&milk()).await;
    assert_eq!(shop.cart().total_amount().await, dec!(2320));

    let state = shop.checkout().start().await.unwrap();

    let CheckoutState::Success(receipt) = state else {
        panic!("expected success, got {state:?}");
    };
    assert_eq!(receipt.remaining_balance, dec!(147680));
    assert_eq!(shop.wallet().balance().await.value(), dec!(147680));
    assert!(shop.cart().is_empty().await);

    let purchase = shop.ledger().latest().await.unwrap();
    assert_eq!(purchase.r#type, TransactionType::Purchase);
    assert_eq!(purchase.amount.value(), dec!(2320));
    assert_eq!(purchase.external_reference, receipt.transaction_id);
    assert_eq!(purchase.items.as_ref().map(Vec::len), Some(2));

    // Everything the session committed is on disk for the next launch.
    let reopened = open_shop(Arc::new(store), instant_gateway()).await;
    assert_eq!(reopened.wallet().balance().await.value(), dec!(147680));
    assert!(reopened.cart().is_empty().await);
    assert_eq!(reopened.ledger().len().await, 1);
}

#[tokio::test]
async fn test_gateway_failure_leaves_state_byte_for_byte() {
    for error in [
        GatewayError::NetworkError,
        GatewayError::ServerError,
        GatewayError::InsufficientFunds,
        GatewayError::InvalidAmount,
    ] {
        let store = InMemoryStore::new();
        let shop = open_shop(Arc::new(store.clone()), Box::new(FailingGateway(error))).await;
        shop.cart().add(&apples()).await;
        shop.cart().add(&milk()).await;
        let before = dump(&store).await;

        let state = shop.checkout().start().await.unwrap();

        assert_eq!(state, CheckoutState::Failed(FailureReason::Gateway(error)));
        assert_eq!(dump(&store).await, before);
        assert_eq!(shop.cart().total_count().await, 2);
        assert_eq!(shop.wallet().balance().await.value(), dec!(150000));
        assert!(shop.ledger().is_empty().await);
    }
}

#[tokio::test]
async fn test_insufficient_balance_never_reaches_gateway() {
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_charge().never();

    let config = ShopConfig {
        initial_balance: Balance::new(dec!(1000)).unwrap(),
    };
    let shop = Shop::open(Arc::new(InMemoryStore::new()), Box::new(gateway), config).await;
    shop.cart().add(&apples()).await;
    shop.cart().add(&apples()).await;

    let state = shop.checkout().start().await.unwrap();

    assert_eq!(state, CheckoutState::Failed(FailureReason::UnableToProcess));
    assert_eq!(shop.cart().total_amount().await, dec!(1500));
    assert_eq!(shop.wallet().balance().await.value(), dec!(1000));
}

#[tokio::test]
async fn test_top_up_then_checkout_history_order() {
    let shop = open_shop(Arc::new(InMemoryStore::new()), instant_gateway()).await;

    let top_up = shop.checkout().add_to_wallet(dec!(50000)).await.unwrap();
    assert_eq!(top_up.r#type, TransactionType::TopUp);
    assert_eq!(shop.wallet().balance().await.value(), dec!(200000));

    shop.cart().add(&milk()).await;
    assert!(matches!(
        shop.checkout().start().await.unwrap(),
        CheckoutState::Success(_)
    ));
    shop.checkout().reset().unwrap();

    let history: Vec<_> = shop
        .ledger()
        .all()
        .await
        .iter()
        .map(|tx| tx.r#type)
        .collect();
    assert_eq!(
        history,
        vec![TransactionType::Purchase, TransactionType::TopUp]
    );

    let reconciliation = shop
        .ledger()
        .reconcile(shop.config().initial_balance, shop.wallet().balance().await)
        .await;
    assert!(reconciliation.is_consistent());
    assert_eq!(reconciliation.actual, dec!(199180));
}

#[tokio::test]
async fn test_checkout_can_be_retried_after_reset() {
    let mut gateway = MockPaymentGateway::new();
    let mut calls = 0;
    gateway.expect_charge().times(2).returning(move |session| {
        calls += 1;
        if calls == 1 {
            Err(GatewayError::NetworkError)
        } else {
            Ok(superpay::domain::checkout::GatewayReceipt {
                success: true,
                transaction_id: "TXN-42-4242".to_string(),
                message: "Payment successful!".to_string(),
                remaining_balance: session.wallet_balance_at_start.value() - session.total_amount,
            })
        }
    });
    let shop = open_shop(Arc::new(InMemoryStore::new()), Box::new(gateway)).await;
    shop.cart().add(&apples()).await;

    let first = shop.checkout().start().await.unwrap();
    assert_eq!(
        first,
        CheckoutState::Failed(FailureReason::Gateway(GatewayError::NetworkError))
    );
    assert!(shop.checkout().start().await.is_err());

    shop.checkout().reset().unwrap();
    let second = shop.checkout().start().await.unwrap();

    assert!(matches!(second, CheckoutState::Success(ref r) if r.transaction_id == "TXN-42-4242"));
    assert_eq!(shop.wallet().balance().await.value(), dec!(149250));
}
