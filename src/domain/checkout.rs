//! Value types shared by the checkout state machine and payment gateways.

use super::cart::{Cart, CartLine};
use super::money::Balance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Point-in-time copy of the cart and wallet taken when a checkout starts.
///
/// The gateway call and the commit both work from this copy, so a cart touched
/// while the payment is in flight does not change what gets charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub items: Vec<CartLine>,
    pub total_amount: Decimal,
    pub wallet_balance_at_start: Balance,
}

impl CheckoutSession {
    pub fn capture(cart: &Cart, balance: Balance) -> Self {
        Self {
            items: cart.lines().to_vec(),
            total_amount: cart.total_amount(),
            wallet_balance_at_start: balance,
        }
    }

    /// Cart non-empty and wallet covering the total.
    pub fn can_proceed(&self) -> bool {
        !self.items.is_empty() && self.wallet_balance_at_start.covers(self.total_amount)
    }
}

/// Successful gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReceipt {
    pub success: bool,
    pub transaction_id: String,
    pub message: String,
    /// What the gateway believes the balance will be; informational only.
    pub remaining_balance: Decimal,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("insufficient funds in your wallet")]
    InsufficientFunds,
    #[error("network connection failed, please try again")]
    NetworkError,
    #[error("invalid transaction amount")]
    InvalidAmount,
    #[error("server error occurred, please try again later")]
    ServerError,
}

/// Why a checkout ended in [`CheckoutState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Precondition failed: empty cart or wallet below the total. The gateway was not called.
    UnableToProcess,
    Gateway(GatewayError),
    /// The gateway answered but reported `success: false`.
    Declined(String),
    /// The commit-time debit was refused.
    WalletDeduction,
    /// `start()` was dropped while the gateway call was pending. Nothing was committed.
    Interrupted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::UnableToProcess => f.write_str("unable to process payment"),
            FailureReason::Gateway(e) => e.fmt(f),
            FailureReason::Declined(message) => write!(f, "payment declined: {message}"),
            FailureReason::WalletDeduction => f.write_str("failed to deduct from wallet"),
            FailureReason::Interrupted => f.write_str("checkout was interrupted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Processing,
    Success(GatewayReceipt),
    Failed(FailureReason),
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Processing => "processing",
            CheckoutState::Success(_) => "success",
            CheckoutState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Success(_) | CheckoutState::Failed(_))
    }
}
