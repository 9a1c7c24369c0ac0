use super::cart::CartService;
use super::checkout::CheckoutProcess;
use super::ledger::Ledger;
use super::wallet::{DEFAULT_WALLET_BALANCE, Wallet};
use crate::domain::money::Balance;
use crate::domain::ports::{PaymentGatewayBox, PersistentStoreRef};
use std::sync::Arc;
use tracing::{info, warn};

/// Settings for the transactional core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopConfig {
    /// Wallet balance on first run, before anything is persisted. Ignored once the
    /// store has recorded an opening balance.
    pub initial_balance: Balance,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            initial_balance: Balance(DEFAULT_WALLET_BALANCE),
        }
    }
}

/// The cart, wallet, ledger and checkout of one running application.
///
/// Built once at startup and handed by reference to whatever drives it.
pub struct Shop {
    config: ShopConfig,
    cart: Arc<CartService>,
    wallet: Arc<Wallet>,
    ledger: Arc<Ledger>,
    checkout: CheckoutProcess,
}

impl Shop {
    /// Loads all persisted state from `store` and wires the checkout to `gateway`.
    ///
    /// Unreadable state is logged and replaced by defaults. A ledger that does not
    /// account for the wallet balance is reported, never corrected by charging.
    pub async fn open(store: PersistentStoreRef, gateway: PaymentGatewayBox, config: ShopConfig) -> Self {
        let cart = Arc::new(CartService::load(store.clone()).await);
        let wallet = Arc::new(Wallet::load(store.clone(), config.initial_balance).await);
        let ledger = Arc::new(Ledger::load(store).await);

        let balance = wallet.balance().await;
        let reconciliation = ledger.reconcile(wallet.opening(), balance).await;
        if !reconciliation.is_consistent() {
            warn!(
                expected = %reconciliation.expected,
                actual = %reconciliation.actual,
                drift = %reconciliation.drift(),
                "ledger does not account for wallet balance"
            );
        }
        info!(
            balance = %balance,
            cart_lines = cart.lines().await.len(),
            history = ledger.len().await,
            "shop opened"
        );

        let checkout = CheckoutProcess::new(cart.clone(), wallet.clone(), ledger.clone(), gateway);
        Self {
            config,
            cart,
            wallet,
            ledger,
            checkout,
        }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartService {
        &self.cart
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn checkout(&self) -> &CheckoutProcess {
        &self.checkout
    }
}
