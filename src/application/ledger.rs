use super::persistence::{load_or_default, persist};
use crate::domain::money::Balance;
use crate::domain::ports::{PersistentStoreRef, StoreKey};
use crate::domain::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Append-only transaction history, newest first.
///
/// Entries are never edited or removed. Reads hand out a shared snapshot, so
/// iterating the history does not block appends.
pub struct Ledger {
    store: PersistentStoreRef,
    entries: Mutex<Arc<VecDeque<Transaction>>>,
}

/// An immutable, restartable view of the ledger at one point in time.
#[derive(Debug, Clone)]
pub struct LedgerEntries(Arc<VecDeque<Transaction>>);

/// Result of comparing the ledger-implied balance with the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// `initial - purchases + top-ups`.
    pub expected: Decimal,
    pub actual: Decimal,
}

impl Reconciliation {
    /// Positive when the wallet holds more than the ledger accounts for.
    pub fn drift(&self) -> Decimal {
        self.actual - self.expected
    }

    pub fn is_consistent(&self) -> bool {
        self.drift().is_zero()
    }
}

impl Ledger {
    pub async fn load(store: PersistentStoreRef) -> Self {
        let entries: VecDeque<Transaction> =
            load_or_default(store.as_ref(), StoreKey::TransactionLedger, VecDeque::new).await;
        Self {
            store,
            entries: Mutex::new(Arc::new(entries)),
        }
    }

    /// Inserts `transaction` at the head and persists the whole history.
    pub async fn append(&self, transaction: Transaction) {
        let mut entries = self.entries.lock().await;
        debug!(id = %transaction.id, kind = ?transaction.r#type, amount = %transaction.amount, "ledger append");
        Arc::make_mut(&mut *entries).push_front(transaction);
        persist(self.store.as_ref(), StoreKey::TransactionLedger, &**entries).await;
    }

    pub async fn all(&self) -> LedgerEntries {
        LedgerEntries(self.entries.lock().await.clone())
    }

    pub async fn latest(&self) -> Option<Transaction> {
        self.entries.lock().await.front().cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Re-derives the balance from the history and compares it with `balance`.
    pub async fn reconcile(&self, initial: Balance, balance: Balance) -> Reconciliation {
        Reconciliation {
            expected: self.all().await.implied_balance(initial.value()),
            actual: balance.value(),
        }
    }
}

impl LedgerEntries {
    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn implied_balance(&self, initial: Decimal) -> Decimal {
        self.iter().fold(initial, |acc, tx| match tx.r#type {
            TransactionType::Purchase => acc - tx.amount.value(),
            TransactionType::TopUp => acc + tx.amount.value(),
        })
    }
}

impl<'a> IntoIterator for &'a LedgerEntries {
    type Item = &'a Transaction;
    type IntoIter = std::collections::vec_deque::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
