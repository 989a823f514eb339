//! Time-boxed key-value cache over a durable store.
//!
//! Expiry is lazy: entries are only checked (and evicted) when read.
//! Every operation is fail-soft: a storage fault is logged and treated
//! as a miss or no-op, never propagated to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::KvStore;

/// Namespace under which all cache entries live in the durable store.
/// `clear` only ever touches keys below this prefix.
pub const CACHE_PREFIX: &str = "techtrend:cache:";

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Persisted envelope: `{ "data": ..., "timestamp": epoch-millis }`.
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    timestamp: i64,
}

#[derive(Clone)]
pub struct ExpiringCache {
    store: Arc<dyn KvStore>,
    default_ttl: Duration,
}

impl ExpiringCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KvStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    fn full_key(key: &str) -> String {
        format!("{CACHE_PREFIX}{key}")
    }

    /// Store a value under `key`, unconditionally overwriting any prior
    /// entry. Storage faults are logged and swallowed.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
        };

        let payload = match serde_json::to_string(&entry) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry for {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.store.set(&Self::full_key(key), &payload) {
            tracing::warn!("Failed to write cache entry for {key}: {e}");
        }
    }

    /// Read a value with the default TTL.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_ttl(key, self.default_ttl)
    }

    /// Read a value, treating entries older than `ttl` as absent and
    /// proactively deleting them. A malformed persisted entry is also
    /// treated as absent.
    pub fn get_with_ttl<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let raw = match self.store.get(&Self::full_key(key)) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read cache entry for {key}: {e}");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding malformed cache entry for {key}: {e}");
                self.remove(key);
                return None;
            }
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(entry.timestamp);
        if age_ms > ttl.as_millis() as i64 {
            tracing::debug!("Cache entry for {key} expired ({age_ms}ms old)");
            self.remove(key);
            return None;
        }

        Some(entry.data)
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(&Self::full_key(key)) {
            tracing::warn!("Failed to remove cache entry for {key}: {e}");
        }
    }

    /// Remove every entry in this cache's namespace, leaving unrelated
    /// persisted state untouched.
    pub fn clear(&self) {
        let keys = match self.store.keys_with_prefix(CACHE_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Failed to list cache entries: {e}");
                return;
            }
        };

        for key in keys {
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!("Failed to remove cache entry {key}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Result, TechTrendError};
    use crate::store::MemoryStore;

    fn cache() -> (Arc<MemoryStore>, ExpiringCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = ExpiringCache::new(store.clone());
        (store, cache)
    }

    #[test]
    fn test_get_after_set_within_ttl() {
        let (_, cache) = cache();
        cache.set("feed:a", &vec![1, 2, 3]);
        assert_eq!(cache.get::<Vec<i32>>("feed:a"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_missing_key_is_none() {
        let (_, cache) = cache();
        assert_eq!(cache.get::<Vec<i32>>("feed:missing"), None);
    }

    #[test]
    fn test_expired_entry_removed_on_read() {
        let (store, cache) = cache();

        // Backdate an entry past the default TTL.
        let stale = Utc::now().timestamp_millis() - (6 * 60 * 1000);
        let payload = format!(r#"{{"data":[1,2,3],"timestamp":{stale}}}"#);
        store.set("techtrend:cache:feed:a", &payload).unwrap();

        assert_eq!(cache.get::<Vec<i32>>("feed:a"), None);
        assert_eq!(store.get("techtrend:cache:feed:a").unwrap(), None);
    }

    #[test]
    fn test_fresh_entry_survives_with_longer_ttl() {
        let (store, cache) = cache();

        let stale = Utc::now().timestamp_millis() - (6 * 60 * 1000);
        let payload = format!(r#"{{"data":[7],"timestamp":{stale}}}"#);
        store.set("techtrend:cache:feed:a", &payload).unwrap();

        // Per-call TTL override: ten minutes keeps the same entry alive.
        assert_eq!(
            cache.get_with_ttl::<Vec<i32>>("feed:a", Duration::from_secs(10 * 60)),
            Some(vec![7])
        );
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let (_, cache) = cache();
        cache.set("feed:a", &vec![1]);
        cache.set("feed:a", &vec![2]);
        assert_eq!(cache.get::<Vec<i32>>("feed:a"), Some(vec![2]));
    }

    #[test]
    fn test_malformed_entry_treated_as_absent() {
        let (store, cache) = cache();
        store.set("techtrend:cache:feed:a", "not json").unwrap();
        assert_eq!(cache.get::<Vec<i32>>("feed:a"), None);
    }

    #[test]
    fn test_clear_only_touches_namespace() {
        let (store, cache) = cache();
        cache.set("feed:a", &1);
        store.set("techtrend:saved:x", "keep").unwrap();

        cache.clear();

        assert_eq!(cache.get::<i32>("feed:a"), None);
        assert_eq!(store.get("techtrend:saved:x").unwrap(), Some("keep".into()));
    }

    struct FailingStore;

    impl crate::store::KvStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(TechTrendError::Other("store down".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(TechTrendError::Other("store down".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(TechTrendError::Other("store down".into()))
        }
        fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Err(TechTrendError::Other("store down".into()))
        }
    }

    #[test]
    fn test_store_faults_degrade_to_miss() {
        let cache = ExpiringCache::new(Arc::new(FailingStore));
        cache.set("feed:a", &vec![1]); // must not panic
        assert_eq!(cache.get::<Vec<i32>>("feed:a"), None);
        cache.remove("feed:a");
        cache.clear();
    }
}
