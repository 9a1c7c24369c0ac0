//! Application layer: the shared cart, wallet and ledger services and the
//! checkout process that coordinates them.
//!
//! Each service owns its state behind a `tokio` mutex and persists through a
//! [`PersistentStore`](crate::domain::ports::PersistentStore) after every mutation.

pub mod cart;
pub mod checkout;
pub mod ledger;
pub mod persistence;
pub mod shop;
pub mod wallet;
