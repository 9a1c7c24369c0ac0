use super::persistence::{load_or_default, persist};
use crate::domain::money::{Amount, Balance};
use crate::domain::ports::{PersistentStoreRef, StoreKey};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

/// Balance a wallet starts with when nothing has been persisted yet.
pub const DEFAULT_WALLET_BALANCE: Decimal = dec!(150000);

/// The process-wide wallet balance.
///
/// The wallet never writes to the ledger; callers pair each mutation with one
/// ledger append.
pub struct Wallet {
    store: PersistentStoreRef,
    opening: Balance,
    balance: Mutex<Balance>,
}

impl Wallet {
    /// Loads the persisted balance, falling back to `initial` on first run.
    ///
    /// The first run also records `initial` as the opening balance. Later runs
    /// keep the recorded value whatever `initial` they are given.
    pub async fn load(store: PersistentStoreRef, initial: Balance) -> Self {
        let recorded: Option<Balance> =
            load_or_default(store.as_ref(), StoreKey::OpeningBalance, || None).await;
        let opening = match recorded {
            Some(opening) => opening,
            None => {
                persist(store.as_ref(), StoreKey::OpeningBalance, &initial).await;
                initial
            }
        };
        let balance = load_or_default(store.as_ref(), StoreKey::WalletBalance, || opening).await;
        Self {
            store,
            opening,
            balance: Mutex::new(balance),
        }
    }

    /// The balance the ledger history starts from.
    pub fn opening(&self) -> Balance {
        self.opening
    }

    pub async fn balance(&self) -> Balance {
        *self.balance.lock().await
    }

    pub async fn credit(&self, amount: Amount) -> Balance {
        let mut balance = self.balance.lock().await;
        *balance = *balance + amount;
        persist(self.store.as_ref(), StoreKey::WalletBalance, &*balance).await;
        *balance
    }

    /// Debits `amount`, refusing with [`PaymentError::InsufficientFunds`] and
    /// leaving the balance untouched when it does not cover the amount.
    pub async fn debit(&self, amount: Amount) -> Result<Balance> {
        let mut balance = self.balance.lock().await;
        let remaining =
            balance
                .checked_sub(amount)
                .ok_or_else(|| PaymentError::InsufficientFunds {
                    balance: balance.value(),
                    requested: amount.value(),
                })?;
        *balance = remaining;
        persist(self.store.as_ref(), StoreKey::WalletBalance, &*balance).await;
        Ok(remaining)
    }
}
