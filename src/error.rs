use crate::domain::ports::CatalogError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("A checkout is already in progress")]
    CheckoutInProgress,
    #[error("Cannot {action} while checkout is {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
