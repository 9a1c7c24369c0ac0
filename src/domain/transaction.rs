use super::cart::CartLine;
use super::money::Amount;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum TransactionType {
    Purchase,
    #[serde(rename = "Top Up")]
    TopUp,
}

/// An immutable ledger record of one wallet mutation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub r#type: TransactionType,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
    /// Reference assigned by the gateway (purchases) or the top-up flow.
    pub external_reference: String,
    /// Snapshot of the purchased lines; only present for purchases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CartLine>>,
}

impl Transaction {
    pub fn purchase(amount: Amount, external_reference: String, items: Vec<CartLine>) -> Self {
        Self {
            id: Uuid::new_v4(),
            r#type: TransactionType::Purchase,
            amount,
            timestamp: Utc::now(),
            external_reference,
            items: Some(items),
        }
    }

    pub fn top_up(amount: Amount, external_reference: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            r#type: TransactionType::TopUp,
            amount,
            timestamp: Utc::now(),
            external_reference,
            items: None,
        }
    }
}

/// Generates a reference in the `TXN-<unix seconds>-<4 digits>` format.
pub fn generate_reference() -> String {
    let seconds = Utc::now().timestamp();
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("TXN-{seconds}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::Product;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_format() {
        let reference = generate_reference();
        let parts: Vec<_> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TXN");
        assert!(parts[1].parse::<i64>().is_ok());
        let suffix: u16 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn test_top_up_has_no_items() {
        let tx = Transaction::top_up(Amount::new(dec!(50000)).unwrap(), "TXN-1-1000".into());
        assert_eq!(tx.r#type, TransactionType::TopUp);
        assert!(tx.items.is_none());

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "Top Up");
        assert!(json.get("items").is_none());
    }

    #[test]
    fn test_transaction_json_is_lossless() {
        let line = CartLine::new(Product::new("p1", "Thing", dec!(19.99), "Misc"));
        let tx = Transaction::purchase(
            Amount::new(dec!(19.99)).unwrap(),
            "TXN-1700000000-4242".into(),
            vec![line],
        );

        let bytes = serde_json::to_vec(&tx).unwrap();
        let decoded: Transaction = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.timestamp, tx.timestamp);
    }
}
