use thiserror::Error;

/// Key-value store error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// TTL-bound key-value store contract.
///
/// Every entry is written with a lifetime; an expired entry is
/// indistinguishable from one that never existed. Per-key atomicity is the
/// store's concern: concurrent writers to the same key are only as safe as
/// the backend makes them.
pub trait KvStore: Send + Sync {
    /// Read a live value. Absent and expired keys both return `None`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value with a lifetime in seconds, replacing any previous
    /// value and lifetime.
    fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Remaining lifetime of a live key in seconds; `None` if absent or
    /// expired.
    fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
