//! In-memory cache for template assets, keyed by resource identifier.
//!
//! Each key is populated at most once. Concurrent callers asking for the
//! same key wait on a single load. A failed load leaves the key empty so
//! the next caller retries; a populated entry is never replaced.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info};

type Slot = Arc<OnceCell<Arc<[u8]>>>;

/// Memoizes asset bytes per resource identifier.
#[derive(Debug, Default)]
pub struct AssetCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl AssetCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached bytes for `key`, running `load` if it has never
    /// completed successfully.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &str, load: F) -> Result<Arc<[u8]>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
    {
        let slot = self.slot(key);
        let bytes = slot
            .get_or_try_init(|| async move {
                debug!(key, "Asset cache miss, loading");
                let bytes = load().await?;
                info!(key, len = bytes.len(), "Asset cached");
                Ok::<_, E>(Arc::<[u8]>::from(bytes))
            })
            .await?;
        Ok(Arc::clone(bytes))
    }

    /// Cached bytes for `key`, if already populated.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(key.to_string()).or_default())
    }
}
