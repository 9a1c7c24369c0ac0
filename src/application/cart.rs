use super::persistence::{load_or_default, persist};
use crate::domain::cart::{Cart, CartLine};
use crate::domain::ports::{PersistentStoreRef, StoreKey};
use crate::domain::product::Product;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::debug;

/// The process-wide shopping cart.
///
/// Every mutation runs under one lock and is followed by a save while the lock is
/// still held, so the stored lines always reflect the latest in-memory cart.
pub struct CartService {
    store: PersistentStoreRef,
    cart: Mutex<Cart>,
}

impl CartService {
    /// Loads the cart persisted under [`StoreKey::CartItems`], or starts empty.
    pub async fn load(store: PersistentStoreRef) -> Self {
        let lines: Vec<CartLine> =
            load_or_default(store.as_ref(), StoreKey::CartItems, Vec::new).await;
        Self {
            store,
            cart: Mutex::new(Cart::from_lines(lines)),
        }
    }

    async fn mutate<F>(&self, op: &'static str, f: F)
    where
        F: FnOnce(&mut Cart),
    {
        let mut cart = self.cart.lock().await;
        f(&mut cart);
        debug!(op, lines = cart.lines().len(), count = cart.total_count(), "cart updated");
        persist(self.store.as_ref(), StoreKey::CartItems, cart.lines()).await;
    }

    pub async fn add(&self, product: &Product) {
        self.mutate("add", |cart| cart.add(product)).await;
    }

    pub async fn remove(&self, product: &Product) {
        self.mutate("remove", |cart| cart.remove(product)).await;
    }

    /// Sets the quantity of a line already in the cart. Absent products are ignored.
    pub async fn set_quantity(&self, product: &Product, quantity: i64) {
        self.mutate("set_quantity", |cart| cart.set_quantity(product, quantity))
            .await;
    }

    pub async fn clear(&self) {
        self.mutate("clear", Cart::clear).await;
    }

    /// Removes the quantities of a completed purchase.
    pub async fn deduct(&self, purchased: &[CartLine]) {
        self.mutate("deduct", |cart| cart.deduct(purchased)).await;
    }

    /// A copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn lines(&self) -> Vec<CartLine> {
        self.cart.lock().await.lines().to_vec()
    }

    pub async fn total_amount(&self) -> Decimal {
        self.cart.lock().await.total_amount()
    }

    pub async fn total_count(&self) -> u64 {
        self.cart.lock().await.total_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.cart.lock().await.is_empty()
    }

    pub async fn contains(&self, product_id: &str) -> bool {
        self.cart.lock().await.line(product_id).is_some()
    }

    /// Quantity in the cart for `product_id`, 0 when absent.
    pub async fn quantity_of(&self, product_id: &str) -> u32 {
        self.cart
            .lock()
            .await
            .line(product_id)
            .map_or(0, |line| line.quantity)
    }
}
