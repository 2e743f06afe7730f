//! Durable key-value store protocol for rate-limit state
//!
//! The limiter only defines the protocol against the store; the binding is
//! injected at start-up. Writes carry a time-to-live so entries expire on
//! their own; there is no explicit deletion path.

use anyhow::Result;
use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use std::time::{Duration, Instant};

/// Protocol the rate limiter speaks against its backing store.
///
/// Writes must be all-or-nothing from the store's perspective; a reader
/// must never observe a half-updated value.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value for a key, if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value under a key with the given time-to-live.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory [`KvStore`] with per-entry expiry.
///
/// Suitable for single-process deployments and tests. Multi-instance
/// deployments inject a shared durable store instead.
pub struct MemoryKvStore {
    cache: Cache<String, Entry>,
}

impl MemoryKvStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .expire_after(PerEntryTtl)
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new(100_000)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|e| e.value))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.cache.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }
}
