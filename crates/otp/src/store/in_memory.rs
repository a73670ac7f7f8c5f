use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::r#trait::{KvStore, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory TTL key-value store.
///
/// Intended for tests/dev. Expiry is evaluated lazily at access time; there
/// is no background reaper.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_entry(entry: &Entry, now: Instant) -> bool {
        entry.expires_at > now
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        match entries.get(key) {
            Some(entry) if Self::live_entry(entry, now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = Instant::now();
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        Ok(entries.get(key).and_then(|entry| {
            if Self::live_entry(entry, now) {
                Some(entry.expires_at.duration_since(now).as_secs())
            } else {
                None
            }
        }))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;

        entries.remove(key);
        Ok(())
    }
}
