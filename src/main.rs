use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use superpay::application::shop::{Shop, ShopConfig};
use superpay::domain::checkout::CheckoutState;
use superpay::domain::money::Balance;
use superpay::domain::ports::{CatalogService, CatalogServiceBox, PersistentStoreRef};
use superpay::domain::product::Product;
use superpay::infrastructure::catalog::{FileCatalog, find_product};
use superpay::infrastructure::file::FileStore;
use superpay::infrastructure::gateway::{GatewayConfig, SimulatedGateway};
use superpay::infrastructure::in_memory::InMemoryStore;
use superpay::interfaces::csv::statement_writer::StatementWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the cart, wallet and ledger as JSON files.
    #[arg(long, env = "SUPERPAY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to a RocksDB database. Takes precedence over --data-dir.
    #[arg(long, env = "SUPERPAY_DB_PATH")]
    db_path: Option<PathBuf>,

    /// JSON product list (`{"products": [...]}`); defaults to the bundled catalog.
    #[arg(long, env = "SUPERPAY_CATALOG")]
    catalog: Option<PathBuf>,

    /// Wallet balance on first run.
    #[arg(long, env = "SUPERPAY_INITIAL_BALANCE", default_value = "150000")]
    initial_balance: Decimal,

    /// Probability that the simulated gateway accepts a valid payment.
    #[arg(long, env = "SUPERPAY_GATEWAY_SUCCESS_RATE", default_value_t = 0.8, value_parser = parse_rate)]
    gateway_success_rate: f64,

    #[arg(long, env = "SUPERPAY_GATEWAY_MIN_DELAY_MS", default_value_t = 1000)]
    gateway_min_delay_ms: u64,

    #[arg(long, env = "SUPERPAY_GATEWAY_MAX_DELAY_MS", default_value_t = 3000)]
    gateway_max_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog
    Products,
    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Show the wallet balance
    Wallet,
    /// Add money to the wallet
    TopUp {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Pay for the cart through the payment gateway
    Checkout,
    /// Print the transaction history, newest first
    History,
}

#[derive(Subcommand)]
enum CartCommand {
    Show,
    Add { product: String },
    Remove { product: String },
    Set {
        product: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    Clear,
}

fn parse_rate(s: &str) -> std::result::Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is not within 0.0..=1.0"))
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_database(path: PathBuf) -> Result<PersistentStoreRef> {
    use superpay::infrastructure::rocksdb::RocksDBStore;
    Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_database(path: PathBuf) -> Result<PersistentStoreRef> {
    tracing::warn!(
        path = %path.display(),
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(Arc::new(InMemoryStore::new()))
}

fn open_store(cli: &Cli) -> Result<PersistentStoreRef> {
    if let Some(db_path) = &cli.db_path {
        open_database(db_path.clone())
    } else if let Some(dir) = &cli.data_dir {
        Ok(Arc::new(FileStore::open(dir).into_diagnostic()?))
    } else {
        Ok(Arc::new(InMemoryStore::new()))
    }
}

/// Prefers the snapshot already in the cart so lines stay removable after the
/// catalog drops a product.
async fn resolve_product(shop: &Shop, catalog: &dyn CatalogService, id: &str) -> Result<Product> {
    if let Some(line) = shop.cart().lines().await.into_iter().find(|l| l.product_id == id) {
        return Ok(line.product);
    }
    find_product(catalog, id).await.into_diagnostic()
}

async fn print_cart_summary(shop: &Shop) {
    println!(
        "cart: {} items, total {}",
        shop.cart().total_count().await,
        shop.cart().total_amount().await
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let initial_balance = Balance::new(cli.initial_balance).into_diagnostic()?;
    if cli.gateway_max_delay_ms < cli.gateway_min_delay_ms {
        return Err(miette!(
            "--gateway-max-delay-ms must not be lower than --gateway-min-delay-ms"
        ));
    }
    let gateway = SimulatedGateway::new(GatewayConfig {
        success_rate: cli.gateway_success_rate,
        min_delay: Duration::from_millis(cli.gateway_min_delay_ms),
        max_delay: Duration::from_millis(cli.gateway_max_delay_ms),
    });
    let catalog: CatalogServiceBox = match &cli.catalog {
        Some(path) => Box::new(FileCatalog::from_path(path)),
        None => Box::new(FileCatalog::bundled()),
    };

    let store = open_store(&cli)?;
    let shop = Shop::open(store, Box::new(gateway), ShopConfig { initial_balance }).await;

    let stdout = io::stdout();
    match cli.command {
        Command::Products => {
            let products = catalog.fetch_products().await.into_diagnostic()?;
            let mut writer = StatementWriter::new(stdout.lock());
            writer.write_products(&products).into_diagnostic()?;
        }
        Command::Cart(CartCommand::Show) => {
            let mut writer = StatementWriter::new(stdout.lock());
            writer
                .write_cart(&shop.cart().lines().await)
                .into_diagnostic()?;
            drop(writer);
            print_cart_summary(&shop).await;
        }
        Command::Cart(CartCommand::Add { product }) => {
            let product = find_product(catalog.as_ref(), &product)
                .await
                .into_diagnostic()?;
            shop.cart().add(&product).await;
            print_cart_summary(&shop).await;
        }
        Command::Cart(CartCommand::Remove { product }) => {
            let product = resolve_product(&shop, catalog.as_ref(), &product).await?;
            shop.cart().remove(&product).await;
            print_cart_summary(&shop).await;
        }
        Command::Cart(CartCommand::Set { product, quantity }) => {
            let product = resolve_product(&shop, catalog.as_ref(), &product).await?;
            shop.cart().set_quantity(&product, quantity).await;
            print_cart_summary(&shop).await;
        }
        Command::Cart(CartCommand::Clear) => {
            shop.cart().clear().await;
            print_cart_summary(&shop).await;
        }
        Command::Wallet => {
            println!("balance: {}", shop.wallet().balance().await);
        }
        Command::TopUp { amount } => {
            if let Some(tx) = shop.checkout().add_to_wallet(amount).await {
                println!("reference: {}", tx.external_reference);
            }
            println!("balance: {}", shop.wallet().balance().await);
        }
        Command::Checkout => match shop.checkout().start().await.into_diagnostic()? {
            CheckoutState::Success(receipt) => {
                println!(
                    "payment successful: reference {}, balance {}",
                    receipt.transaction_id,
                    shop.wallet().balance().await
                );
            }
            CheckoutState::Failed(reason) => {
                println!("payment failed: {reason}");
            }
            other => {
                return Err(miette!("checkout ended in unexpected state {}", other.name()));
            }
        },
        Command::History => {
            let mut writer = StatementWriter::new(stdout.lock());
            writer
                .write_history(&shop.ledger().all().await)
                .into_diagnostic()?;
        }
    }

    Ok(())
}
