use super::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product in the cart together with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub product: Product,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product: Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product,
            quantity: 1,
        }
    }

    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Ordered collection of cart lines keyed by product id.
///
/// Lines keep their insertion order for display. All operations here are pure
/// in-memory arithmetic; sharing and persistence live in
/// [`CartService`](crate::application::cart::CartService).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from persisted lines, merging duplicate ids and dropping
    /// zero quantities so the invariants hold for hand-edited data too.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match cart.position(&line.product_id) {
                Some(index) => {
                    let merged = &mut cart.lines[index].quantity;
                    *merged = merged.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// Adds one unit. Quantities stop growing at `u32::MAX`.
    pub fn add(&mut self, product: &Product) {
        match self.position(&product.id) {
            Some(index) => {
                let quantity = &mut self.lines[index].quantity;
                *quantity = quantity.saturating_add(1);
            }
            None => self.lines.push(CartLine::new(product.clone())),
        }
    }

    pub fn remove(&mut self, product: &Product) {
        if let Some(index) = self.position(&product.id) {
            if self.lines[index].quantity > 1 {
                self.lines[index].quantity -= 1;
            } else {
                self.lines.remove(index);
            }
        }
    }

    /// Sets the quantity of an existing line; `n <= 0` deletes it.
    ///
    /// Products that are not already in the cart are left out: this never inserts.
    pub fn set_quantity(&mut self, product: &Product, n: i64) {
        if let Some(index) = self.position(&product.id) {
            match u32::try_from(n) {
                Ok(quantity) if quantity > 0 => self.lines[index].quantity = quantity,
                Ok(_) => {
                    self.lines.remove(index);
                }
                // Negative deletes, anything above u32::MAX saturates.
                Err(_) if n < 0 => {
                    self.lines.remove(index);
                }
                Err(_) => self.lines[index].quantity = u32::MAX,
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Takes purchased quantities out of the cart.
    ///
    /// Units added after `purchased` was captured stay in the cart. With no
    /// changes in between this empties it.
    pub fn deduct(&mut self, purchased: &[CartLine]) {
        for bought in purchased {
            if let Some(index) = self.position(&bought.product_id) {
                let remaining = self.lines[index].quantity.saturating_sub(bought.quantity);
                if remaining == 0 {
                    self.lines.remove(index);
                } else {
                    self.lines[index].quantity = remaining;
                }
            }
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}
