//! Sliding-window abuse control
//!
//! Per-client request timestamps live in an external durable key-value
//! store (see [`KvStore`]); a separate blocked flag with its own expiry
//! keeps an offender out even when it stops sending traffic. The
//! read-modify-write of the timestamp list is not atomic across concurrent
//! requests from one identity; brief over-admission under heavy concurrent
//! load from a single client is an accepted trade-off.
//!
//! Failure policy: any error talking to the store fails open. A storage
//! outage must never become a denial of service for legitimate traffic.

mod store;

pub use store::{KvStore, MemoryKvStore};

use crate::config::LimiterSettings;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Longest header fragment folded into an identity key.
const USER_AGENT_FRAGMENT: usize = 32;
const ACCEPT_FRAGMENT: usize = 16;

/// An opaque rate-limiter key for one client.
///
/// Derived from the connection IP plus bounded-length fragments of a small
/// header set, then hashed. Full header values are never stored, which
/// bounds both key cardinality and what the store learns about a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    key: String,
}

impl ClientIdentity {
    pub fn derive(
        ip: &str,
        user_agent: Option<&str>,
        accept_language: Option<&str>,
        accept_encoding: Option<&str>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(b"|");
        hasher.update(fragment(user_agent, USER_AGENT_FRAGMENT).as_bytes());
        hasher.update(b"|");
        hasher.update(fragment(accept_language, ACCEPT_FRAGMENT).as_bytes());
        hasher.update(b"|");
        hasher.update(fragment(accept_encoding, ACCEPT_FRAGMENT).as_bytes());

        Self {
            key: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn fragment(value: Option<&str>, max: usize) -> String {
    value.unwrap_or("").chars().take(max).collect()
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Rejected; `retry_after` is a positive hint in seconds.
    Block { retry_after: u64 },
}

/// Sliding-window rate limiter over an injected [`KvStore`].
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    settings: LimiterSettings,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, settings: LimiterSettings) -> Self {
        Self { store, settings }
    }

    /// Gate one request from `identity`.
    pub async fn check(&self, identity: &ClientIdentity) -> Decision {
        self.check_at(identity, chrono::Utc::now().timestamp_millis())
            .await
    }

    async fn check_at(&self, identity: &ClientIdentity, now_ms: i64) -> Decision {
        if !self.settings.enabled {
            return Decision::Allow;
        }

        let block_key = format!("block:{}", identity.key());
        let window_key = format!("window:{}", identity.key());
        let now_secs = now_ms / 1000;

        // Blocked flag short-circuits; the timestamp list is not touched.
        match self.store.get(&block_key).await {
            Ok(Some(until)) => {
                let until: i64 = until.parse().unwrap_or(now_secs);
                let retry_after = (until - now_secs).max(1) as u64;
                return Decision::Block { retry_after };
            }
            Ok(None) => {}
            Err(e) => {
                warn!("rate-limit store read failed, allowing request: {}", e);
                return Decision::Allow;
            }
        }

        let mut stamps: Vec<i64> = match self.store.get(&window_key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("rate-limit store read failed, allowing request: {}", e);
                return Decision::Allow;
            }
        };

        let cutoff = now_ms - (self.settings.window_secs as i64) * 1000;
        stamps.retain(|t| *t > cutoff);
        stamps.push(now_ms);

        if stamps.len() > self.settings.max_requests {
            let until = now_secs + self.settings.block_secs as i64;
            if let Err(e) = self
                .store
                .put(
                    &block_key,
                    until.to_string(),
                    Duration::from_secs(self.settings.block_secs),
                )
                .await
            {
                warn!("rate-limit store write failed, allowing request: {}", e);
                return Decision::Allow;
            }
            return Decision::Block {
                retry_after: self.settings.block_secs,
            };
        }

        let serialized = match serde_json::to_string(&stamps) {
            Ok(s) => s,
            Err(e) => {
                warn!("rate-window serialization failed, allowing request: {}", e);
                return Decision::Allow;
            }
        };

        if let Err(e) = self
            .store
            .put(
                &window_key,
                serialized,
                Duration::from_secs(self.settings.window_ttl_secs),
            )
            .await
        {
            warn!("rate-limit store write failed, allowing request: {}", e);
        }

        Decision::Allow
    }
}
