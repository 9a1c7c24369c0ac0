//! Domain types and the ports the core talks to.

pub mod cart;
pub mod checkout;
pub mod money;
pub mod ports;
pub mod product;
pub mod transaction;
