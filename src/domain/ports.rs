use super::checkout::{CheckoutSession, GatewayError, GatewayReceipt};
use super::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use mockall::automock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Logical keys under which the core persists its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    CartItems,
    WalletBalance,
    /// Balance the wallet started from on its first run; the ledger reconciles against it.
    OpeningBalance,
    TransactionLedger,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::CartItems,
        StoreKey::WalletBalance,
        StoreKey::OpeningBalance,
        StoreKey::TransactionLedger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::CartItems => "cart-items",
            StoreKey::WalletBalance => "wallet-balance",
            StoreKey::OpeningBalance => "wallet-opening-balance",
            StoreKey::TransactionLedger => "transaction-ledger",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key/value storage for opaque blobs.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>>;
    async fn save(&self, key: StoreKey, bytes: Vec<u8>) -> Result<()>;
}

/// External payment processor. Treated as opaque and possibly failing.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        session: &CheckoutSession,
    ) -> std::result::Result<GatewayReceipt, GatewayError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid catalog location")]
    InvalidUrl,
    #[error("failed to reach the catalog: {0}")]
    NetworkError(String),
    #[error("failed to parse product data: {0}")]
    DecodingError(String),
    #[error("no products available")]
    NoData,
}

/// Source of products for browsing. Not consumed by the transactional core.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_products(&self) -> std::result::Result<Vec<Product>, CatalogError>;
}

pub type PersistentStoreRef = Arc<dyn PersistentStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type CatalogServiceBox = Box<dyn CatalogService>;
