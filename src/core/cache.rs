//! In-memory TTL cache injected into the input-resolution layer.
//!
//! Entries keep their value after expiry so callers can fall back to the
//! last known value when a refresh fails.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// A cached value together with its freshness window
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe key/value cache with a TTL per entry
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the value only while it is still fresh
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Utc::now()) => {
                debug!("Cache hit for {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry for {:?} expired", key);
                None
            }
            None => {
                debug!("Cache miss for {:?}", key);
                None
            }
        }
    }

    /// Returns the last stored entry regardless of expiry
    pub async fn get_stale(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores a value for `ttl`, replacing any previous entry
    pub async fn insert(&self, key: K, value: V, ttl: Duration) {
        let cached_at = Utc::now();
        let entry = CacheEntry {
            value,
            cached_at,
            expires_at: cached_at + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
