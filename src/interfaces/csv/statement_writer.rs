use crate::application::ledger::LedgerEntries;
use crate::domain::cart::CartLine;
use crate::domain::product::Product;
use crate::domain::transaction::TransactionType;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ProductRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    price: Decimal,
}

#[derive(Serialize)]
struct CartRow<'a> {
    product: &'a str,
    name: &'a str,
    price: Decimal,
    quantity: u32,
    total: Decimal,
}

#[derive(Serialize)]
struct TransactionRow<'a> {
    date: String,
    r#type: &'static str,
    amount: Decimal,
    reference: &'a str,
    items: u64,
}

fn type_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Purchase => "purchase",
        TransactionType::TopUp => "topup",
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Writes the catalog, cart lines and ledger history as CSV.
pub struct StatementWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatementWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    pub fn write_products(&mut self, products: &[Product]) -> Result<()> {
        for product in products {
            self.writer.serialize(ProductRow {
                id: &product.id,
                name: &product.name,
                category: &product.category,
                price: product.price,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per line, in cart order.
    pub fn write_cart(&mut self, lines: &[CartLine]) -> Result<()> {
        for line in lines {
            self.writer.serialize(CartRow {
                product: &line.product_id,
                name: &line.product.name,
                price: line.product.price,
                quantity: line.quantity,
                total: line.line_total(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per transaction, newest first.
    pub fn write_history(&mut self, entries: &LedgerEntries) -> Result<()> {
        for tx in entries {
            let items = tx
                .items
                .as_ref()
                .map_or(0, |lines| lines.iter().map(|l| u64::from(l.quantity)).sum());
            self.writer.serialize(TransactionRow {
                date: format_timestamp(&tx.timestamp),
                r#type: type_label(tx.r#type),
                amount: tx.amount.value(),
                reference: &tx.external_reference,
                items,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| PaymentError::IoError(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ledger::Ledger;
    use crate::domain::money::Amount;
    use crate::domain::transaction::Transaction;
    use crate::infrastructure::in_memory::InMemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_write_cart() {
        let mut line = CartLine::new(Product::new("apples", "Fresh Apples", dec!(750), "Fruits"));
        line.quantity = 2;

        let mut writer = StatementWriter::new(Vec::new());
        writer.write_cart(&[line]).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(
            output,
            "product,name,price,quantity,total\napples,Fresh Apples,750,2,1500\n"
        );
    }

    #[test]
    fn test_write_products() {
        let products = vec![
            Product::new("apples", "Fresh Apples", dec!(750), "Fruits"),
            Product::new("milk", "Whole Milk", dec!(820), "Dairy"),
        ];

        let mut writer = StatementWriter::new(Vec::new());
        writer.write_products(&products).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(
            output,
            "id,name,category,price\napples,Fresh Apples,Fruits,750\nmilk,Whole Milk,Dairy,820\n"
        );
    }

    #[tokio::test]
    async fn test_write_history() {
        let ledger = Ledger::load(Arc::new(InMemoryStore::new())).await;
        ledger
            .append(Transaction::top_up(
                Amount::new(dec!(50000)).unwrap(),
                "TXN-1-1000".to_string(),
            ))
            .await;
        let mut line = CartLine::new(Product::new("milk", "Whole Milk", dec!(820), "Dairy"));
        line.quantity = 3;
        ledger
            .append(Transaction::purchase(
                Amount::new(dec!(2460)).unwrap(),
                "TXN-2-2000".to_string(),
                vec![line],
            ))
            .await;

        let mut writer = StatementWriter::new(Vec::new());
        writer.write_history(&ledger.all().await).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let rows: Vec<_> = output.lines().collect();

        assert_eq!(rows[0], "date,type,amount,reference,items");
        assert!(rows[1].ends_with(",purchase,2460,TXN-2-2000,3"));
        assert!(rows[2].ends_with(",topup,50000,TXN-1-1000,0"));
    }
}
