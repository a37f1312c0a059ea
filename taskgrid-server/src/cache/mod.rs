//! Response caching
//!
//! A `CacheProvider` stores serialized JSON under string keys with an expiry.
//! [`JsonCache`] layers typed access, the enabled switch and the default TTL
//! on top of a provider.

mod config;
mod memory;

pub use config::*;
pub use memory::*;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A cached value with metadata about when it was cached and when it expires.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// The cached data, serialized as JSON.
    pub data: Vec<u8>,
    /// When this value was cached.
    pub created_at: DateTime<Utc>,
    /// When this value expires and should no longer be returned.
    pub expires_at: DateTime<Utc>,
}

impl CachedValue {
    pub fn new(data: Vec<u8>, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            data,
            created_at,
            expires_at,
        }
    }

    /// Creates a cached value expiring `ttl` from now.
    pub fn with_ttl(data: Vec<u8>, ttl: std::time::Duration) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        Self {
            data,
            created_at: now,
            expires_at,
        }
    }

    /// Returns `true` if this cached value has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Trait for cache providers.
///
/// Implementations must never return expired values from `get()`.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Retrieves a cached value by key.
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Stores a value in the cache.
    async fn set(&self, key: &str, value: CachedValue);

    /// Removes a value from the cache.
    async fn remove(&self, key: &str);

    /// Removes every key starting with `prefix`. Returns the number removed.
    async fn remove_prefix(&self, prefix: &str) -> usize;

    /// Clears all values from the cache.
    async fn clear(&self);

    /// Removes all expired entries. Returns the number removed.
    async fn gc(&self) -> usize;
}

/// Typed JSON cache over a [`CacheProvider`].
///
/// When disabled, reads always miss and writes are dropped. Invalidation
/// still reaches the provider.
#[derive(Clone)]
pub struct JsonCache {
    provider: Arc<dyn CacheProvider>,
    config: CacheConfig,
}

impl JsonCache {
    pub fn new(provider: Arc<dyn CacheProvider>, config: CacheConfig) -> Self {
        Self { provider, config }
    }

    /// An in-memory cache with the given settings.
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(Arc::new(InMemoryCache::new()), config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Reads and decodes a value. Undecodable entries count as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let cached = self.provider.get(key).await?;
        match serde_json::from_slice(&cached.data) {
            Ok(value) => {
                log::debug!("cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                log::warn!("dropping undecodable cache entry {}: {}", key, e);
                self.provider.remove(key).await;
                None
            }
        }
    }

    /// Encodes and stores a value with the configured TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if !self.config.enabled {
            return;
        }
        match serde_json::to_vec(value) {
            Ok(data) => {
                self.provider
                    .set(key, CachedValue::with_ttl(data, self.config.ttl))
                    .await;
                log::debug!("cache set: {}, expires in {}s", key, self.config.ttl.as_secs());
            }
            Err(e) => log::warn!("not caching {}: {}", key, e),
        }
    }

    pub async fn remove(&self, key: &str) {
        self.provider.remove(key).await;
        log::debug!("cache delete: {}", key);
    }

    pub async fn remove_prefix(&self, prefix: &str) {
        let removed = self.provider.remove_prefix(prefix).await;
        log::debug!("cache delete (prefix {}): {} entries", prefix, removed);
    }

    pub async fn clear(&self) {
        self.provider.clear().await;
        log::debug!("cache cleared");
    }

    pub async fn gc(&self) -> usize {
        self.provider.gc().await
    }
}

impl std::fmt::Debug for JsonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
