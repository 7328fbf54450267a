//! In-memory result cache with per-entry expiry.
//!
//! Entries are only evicted lazily: an expired entry lingers until the next
//! `get` for its key or a `clear`. The key space is a handful of users times a
//! handful of endpoints, so no background sweeper is needed.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

/// Longest lifetime an entry can get (about a century); larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(3_153_600_000);

/// Derives a cache key from an identity and a set of qualifiers.
///
/// Qualifier names are sorted before serialization, so the key does not depend
/// on the order the qualifiers were supplied in.
pub fn fingerprint(identity: &str, qualifiers: &[(&str, &str)]) -> String {
    let sorted: BTreeMap<&str, &str> = qualifiers.iter().copied().collect();
    let serialized = Value::Object(
        sorted
            .into_iter()
            .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned())))
            .collect::<Map<String, Value>>(),
    )
    .to_string();

    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(b":");
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct ResultCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the stored value while it is fresh. An expired entry
    /// is removed and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let expires_at = entries.get(key)?.expires_at;

        if Instant::now() < expires_at {
            debug!(key, "Cache hit");
            return entries.get(key).map(|entry| entry.value.clone());
        }

        entries.remove(key);
        debug!(key, "Cache entry expired");
        None
    }

    /// Stores `value` until `ttl` from now, replacing any existing entry.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache entry set");
        let Some(expires_at) = Instant::now().checked_add(ttl.min(MAX_TTL)) else {
            warn!(key = %key, "Cache expiry is out of range, entry not stored");
            return;
        };
        self.entries
            .lock()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Drops every entry and returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        info!(count, "Cache cleared");
        count
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        let active_entries = entries
            .values()
            .filter(|entry| now < entry.expires_at)
            .count();

        CacheStats {
            total_entries: entries.len(),
            active_entries,
            expired_entries: entries.len().saturating_sub(active_entries),
        }
    }
}
