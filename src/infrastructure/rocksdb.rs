use crate::domain::ports::{PersistentStore, StoreKey};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the cart, wallet and ledger blobs.
pub const CF_STATE: &str = "state";

/// A persistent store implementation using RocksDB.
///
/// All blobs live in one column family keyed by [`StoreKey::as_str`].
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_state = ColumnFamilyDescriptor::new(CF_STATE, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_state])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> PaymentError {
        PaymentError::InternalError(Box::new(std::io::Error::other(
            "State column family not found",
        )))
    }
}

#[async_trait]
impl PersistentStore for RocksDBStore {
    async fn load(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        let cf = self.db.cf_handle(CF_STATE).ok_or_else(Self::missing_cf)?;
        Ok(self.db.get_cf(&cf, key.as_str())?)
    }

    async fn save(&self, key: StoreKey, bytes: Vec<u8>) -> Result<()> {
        let cf = self.db.cf_handle(CF_STATE).ok_or_else(Self::missing_cf)?;
        self.db.put_cf(&cf, key.as_str(), bytes)?;
        Ok(())
    }
}
