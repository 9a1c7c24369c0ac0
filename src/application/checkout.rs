use super::cart::CartService;
use super::ledger::Ledger;
use super::wallet::Wallet;
use crate::domain::checkout::{
    CheckoutSession, CheckoutState, FailureReason, GatewayError, GatewayReceipt,
};
use crate::domain::money::Amount;
use crate::domain::ports::PaymentGatewayBox;
use crate::domain::transaction::{Transaction, generate_reference};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

fn transition(state: &watch::Sender<CheckoutState>, next: CheckoutState) -> CheckoutState {
    debug!(state = next.name(), "checkout transition");
    state.send_replace(next.clone());
    next
}

/// Cart, wallet and ledger handles plus the state channel; cloned into the
/// commit task.
#[derive(Clone)]
struct Books {
    cart: Arc<CartService>,
    wallet: Arc<Wallet>,
    ledger: Arc<Ledger>,
    state: Arc<watch::Sender<CheckoutState>>,
    // Serializes wallet+ledger pairs so history order follows wallet order.
    commit: Arc<Mutex<()>>,
}

impl Books {
    async fn commit(&self, session: &CheckoutSession, receipt: GatewayReceipt) -> CheckoutState {
        let _commit = self.commit.lock().await;

        let Ok(amount) = Amount::new(session.total_amount) else {
            warn!(total = %session.total_amount, "gateway accepted a non-positive total");
            return CheckoutState::Failed(FailureReason::Gateway(GatewayError::InvalidAmount));
        };

        let remaining = match self.wallet.debit(amount).await {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!(error = %e, reference = %receipt.transaction_id, "commit debit refused");
                return CheckoutState::Failed(FailureReason::WalletDeduction);
            }
        };

        if remaining.value() != receipt.remaining_balance {
            warn!(
                wallet = %remaining,
                gateway = %receipt.remaining_balance,
                "gateway balance hint differs from wallet"
            );
        }

        self.ledger
            .append(Transaction::purchase(
                amount,
                receipt.transaction_id.clone(),
                session.items.clone(),
            ))
            .await;
        self.cart.deduct(&session.items).await;

        info!(amount = %amount, reference = %receipt.transaction_id, balance = %remaining, "checkout committed");
        CheckoutState::Success(receipt)
    }
}

/// Moves a checkout left in `Processing` to `Failed(Interrupted)` when `start()`
/// is dropped before the gateway answers.
struct InterruptGuard<'a> {
    state: &'a watch::Sender<CheckoutState>,
    armed: bool,
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            warn!("checkout dropped while waiting on the gateway");
            *state = CheckoutState::Failed(FailureReason::Interrupted);
            true
        });
    }
}

/// Turns the cart into a purchase through the payment gateway.
///
/// `Idle -> Processing -> Success | Failed`, back to `Idle` through [`reset`](Self::reset).
/// Only a gateway success reaches the commit step, which debits the wallet,
/// appends the purchase and takes the purchased lines out of the cart. Every
/// other outcome leaves cart, wallet and ledger untouched.
///
/// Once the gateway has accepted a payment the commit runs on its own task, so
/// dropping the `start()` future cannot split a debit from its ledger entry.
pub struct CheckoutProcess {
    books: Books,
    gateway: PaymentGatewayBox,
    in_flight: Mutex<()>,
}

impl CheckoutProcess {
    pub fn new(
        cart: Arc<CartService>,
        wallet: Arc<Wallet>,
        ledger: Arc<Ledger>,
        gateway: PaymentGatewayBox,
    ) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            books: Books {
                cart,
                wallet,
                ledger,
                state: Arc::new(state),
                commit: Arc::new(Mutex::new(())),
            },
            gateway,
            in_flight: Mutex::new(()),
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.books.state.borrow().clone()
    }

    /// Receives every state transition.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.books.state.subscribe()
    }

    fn transition(&self, next: CheckoutState) -> CheckoutState {
        transition(&self.books.state, next)
    }

    /// Runs one checkout and returns the terminal state it reached.
    ///
    /// Fails fast with [`PaymentError::CheckoutInProgress`] when another call is
    /// still waiting on the gateway, and with [`PaymentError::InvalidTransition`]
    /// when the previous outcome has not been [`reset`](Self::reset).
    pub async fn start(&self) -> Result<CheckoutState> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| PaymentError::CheckoutInProgress)?;

        let current = self.state();
        if current != CheckoutState::Idle {
            return Err(PaymentError::InvalidTransition {
                from: current.name(),
                action: "start checkout",
            });
        }

        let books = &self.books;
        let session = CheckoutSession::capture(&books.cart.snapshot().await, books.wallet.balance().await);
        if !session.can_proceed() {
            info!(
                total = %session.total_amount,
                balance = %session.wallet_balance_at_start,
                lines = session.items.len(),
                "checkout precondition failed"
            );
            return Ok(self.transition(CheckoutState::Failed(FailureReason::UnableToProcess)));
        }

        self.transition(CheckoutState::Processing);
        let mut guard = InterruptGuard {
            state: &books.state,
            armed: true,
        };

        let charged = self.gateway.charge(&session).await;
        let outcome = match charged {
            Ok(receipt) if receipt.success => {
                guard.armed = false;
                let books = books.clone();
                let commit = tokio::spawn(async move {
                    let outcome = books.commit(&session, receipt).await;
                    transition(&books.state, outcome)
                });
                return match commit.await {
                    Ok(state) => Ok(state),
                    Err(e) => {
                        self.transition(CheckoutState::Failed(FailureReason::Interrupted));
                        Err(PaymentError::InternalError(Box::new(e)))
                    }
                };
            }
            Ok(receipt) => {
                warn!(reference = %receipt.transaction_id, message = %receipt.message, "gateway declined payment");
                CheckoutState::Failed(FailureReason::Declined(receipt.message))
            }
            Err(e) => {
                warn!(error = %e, "gateway charge failed");
                CheckoutState::Failed(FailureReason::Gateway(e))
            }
        };

        Ok(self.transition(outcome))
    }

    /// Returns a finished checkout to `Idle`. Idempotent on `Idle`.
    pub fn reset(&self) -> Result<()> {
        let mut result = Ok(());
        self.books.state.send_if_modified(|state| match state {
            CheckoutState::Idle => false,
            CheckoutState::Processing => {
                result = Err(PaymentError::InvalidTransition {
                    from: "processing",
                    action: "reset",
                });
                false
            }
            CheckoutState::Success(_) | CheckoutState::Failed(_) => {
                *state = CheckoutState::Idle;
                true
            }
        });
        result
    }

    /// Credits the wallet and records a top-up.
    ///
    /// Non-positive amounts are ignored and yield `None`.
    pub async fn add_to_wallet(&self, amount: Decimal) -> Option<Transaction> {
        let Ok(amount) = Amount::new(amount) else {
            debug!(%amount, "ignoring non-positive top-up");
            return None;
        };

        let books = &self.books;
        let _commit = books.commit.lock().await;
        let balance = books.wallet.credit(amount).await;
        let transaction = Transaction::top_up(amount, generate_reference());
        books.ledger.append(transaction.clone()).await;

        info!(amount = %amount, reference = %transaction.external_reference, balance = %balance, "wallet topped up");
        Some(transaction)
    }
}
