//! Typed load/save over a [`PersistentStore`].
//!
//! Stored state is JSON. Inside the services, persistence is best effort: a failed
//! save or an unreadable blob is logged and the in-memory value stays authoritative
//! for the running session.

use crate::domain::ports::{PersistentStore, StoreKey};
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Loads and decodes the value stored under `key`, if any.
pub async fn load_typed<T: DeserializeOwned>(
    store: &dyn PersistentStore,
    key: StoreKey,
) -> Result<Option<T>> {
    match store.load(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encodes `value` and stores it under `key`.
pub async fn save_typed<T: Serialize + ?Sized>(
    store: &dyn PersistentStore,
    key: StoreKey,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.save(key, bytes).await
}

pub(crate) async fn load_or_default<T, F>(store: &dyn PersistentStore, key: StoreKey, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match load_typed(store, key).await {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            warn!(%key, error = %e, "failed to load persisted state, starting from default");
            default()
        }
    }
}

pub(crate) async fn persist<T: Serialize + ?Sized>(
    store: &dyn PersistentStore,
    key: StoreKey,
    value: &T,
) {
    if let Err(e) = save_typed(store, key, value).await {
        warn!(%key, error = %e, "failed to persist state, keeping in-memory value");
    }
}
