#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use superpay::application::shop::{Shop, ShopConfig};
use superpay::domain::checkout::{CheckoutSession, GatewayError, GatewayReceipt};
use superpay::domain::ports::{PaymentGateway, PersistentStore, StoreKey};
use superpay::domain::product::Product;
use superpay::error::{PaymentError, Result};
use superpay::infrastructure::gateway::{GatewayConfig, SimulatedGateway};
use superpay::infrastructure::in_memory::InMemoryStore;

/// Store whose every call fails, as a full disk or revoked permissions would.
pub struct FailingStore;

#[async_trait]
impl PersistentStore for FailingStore {
    async fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        Err(PaymentError::Persistence(format!("cannot read {key}")))
    }

    async fn save(&self, key: StoreKey, _bytes: Vec<u8>) -> Result<()> {
        Err(PaymentError::Persistence(format!("cannot write {key}")))
    }
}

/// Gateway that always answers with the same error.
pub struct FailingGateway(pub GatewayError);

#[async_trait]
impl PaymentGateway for FailingGateway {
    async fn charge(&self, _session: &CheckoutSession) -> std::result::Result<GatewayReceipt, GatewayError> {
        Err(self.0)
    }
}

pub fn apples() -> Product {
    Product::new("apples", "Fresh Apples", Decimal::from(750), "Fruits")
}

pub fn milk() -> Product {
    Product::new("milk", "Whole Milk", Decimal::from(820), "Dairy")
}

pub fn instant_gateway() -> Box<dyn PaymentGateway> {
    Box::new(SimulatedGateway::new(GatewayConfig::instant()))
}

pub async fn open_shop(store: Arc<dyn PersistentStore>, gateway: Box<dyn PaymentGateway>) -> Shop {
    Shop::open(store, gateway, ShopConfig::default()).await
}

/// Raw bytes of every key, for byte-for-byte comparisons.
pub async fn dump(store: &InMemoryStore) -> Vec<Option<Vec<u8>>> {
    let mut blobs = Vec::new();
    for key in StoreKey::ALL {
        blobs.push(store.load(key).await.unwrap());
    }
    blobs
}
