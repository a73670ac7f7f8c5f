//! TTL-bound key-value storage boundary.
//!
//! This module defines the narrow contract the OTP engine consumes without
//! making any storage assumptions. Expiry is the store's job: the engine
//! never runs timers of its own.

pub mod in_memory;
pub mod r#trait;

#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryKvStore;
pub use r#trait::{KvStore, StoreError};

#[cfg(feature = "redis")]
pub use redis::RedisKvStore;
