//! Redis-backed key-value store (optional).
//!
//! Thin synchronous adapter over GET/SETEX/TTL/DEL. Redis owns expiry and
//! per-key atomicity; this client adds nothing on top.

use redis::Commands;

use super::r#trait::{KvStore, StoreError};

/// Redis adapter for TTL-bound OTP entries.
#[derive(Debug, Clone)]
pub struct RedisKvStore {
    client: redis::Client,
}

impl RedisKvStore {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        self.client
            .get_connection()
            .map_err(|e| StoreError::backend(e.to_string()))
    }
}

impl KvStore for RedisKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        conn.get(key).map_err(|e| StoreError::backend(e.to_string()))
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let mut conn = self.connection()?;
        let remaining: i64 = conn
            .ttl(key)
            .map_err(|e| StoreError::backend(e.to_string()))?;

        // Redis reports -2 for a missing key and -1 for a key without expiry;
        // every entry this engine writes carries one.
        if remaining < 0 {
            Ok(None)
        } else {
            Ok(Some(remaining as u64))
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let _: i64 = conn
            .del(key)
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(())
    }
}
