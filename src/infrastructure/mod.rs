//! Adapters for the domain ports: blob stores, the simulated payment gateway
//! and the product catalog.

pub mod catalog;
pub mod file;
pub mod gateway;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
