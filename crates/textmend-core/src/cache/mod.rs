//! Content-addressed correction cache
//!
//! Keys are sha256 digests of the caller's key material, so raw text
//! never serves as a map key and key length stays bounded. Entries
//! expire after `max_age` and are evicted lowest hits-per-age first
//! when the byte budget would overflow.
//!
//! The cache is an explicitly constructed service object shared via
//! `Arc`; all methods take `&self` and serialize access internally, so
//! chunk-parallel correction tasks can use it concurrently.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

pub mod types;

#[cfg(test)]
mod tests;

pub use types::{CacheConfig, CacheEntry, CacheStats};

/// Sha256 digest of arbitrary key material, hex-encoded
pub fn content_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    config: CacheConfig,
    hits: u64,
    misses: u64,
}

impl CacheInner {
    fn total_size(&self) -> usize {
        self.entries.values().map(|e| e.size).sum()
    }

    /// Evict lowest-scoring entries until `required` more bytes fit
    /// within the budget, or the cache is empty.
    fn ensure_space(&mut self, required: usize, now: DateTime<Utc>) {
        let mut current = self.total_size();
        if current + required <= self.config.max_size {
            return;
        }

        let mut candidates: Vec<(String, f64, usize)> = self
            .entries
            .iter()
            .map(|(hash, entry)| (hash.clone(), entry.score(now), entry.size))
            .collect();
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        for (hash, _, size) in candidates {
            if current + required <= self.config.max_size {
                break;
            }
            self.entries.remove(&hash);
            current -= size;
            let prefix = &hash[..16.min(hash.len())];
            debug!(evicted = %prefix, "cache entry evicted");
        }
    }
}

/// Exported cache state
#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    cache: Vec<(String, CacheEntry)>,
    stats: SnapshotStats,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotStats {
    hits: u64,
    misses: u64,
}

/// Content-addressed cache of corrected texts
#[derive(Debug)]
pub struct CorrectionCache {
    inner: Mutex<CacheInner>,
}

impl CorrectionCache {
    /// Create a cache with the given budget and lifetime
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                config,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up the corrected text for `key`. A present-but-expired
    /// entry is removed and counted as a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        let hash = content_hash(key);
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let max_age = inner.config.max_age;

        let expired = inner
            .entries
            .get(&hash)
            .is_some_and(|entry| entry.is_expired(max_age, now));
        if expired {
            inner.entries.remove(&hash);
            inner.misses += 1;
            return None;
        }
        if let Some(entry) = inner.entries.get_mut(&hash) {
            entry.hits += 1;
            let value = entry.value.clone();
            inner.hits += 1;
            return Some(value);
        }
        inner.misses += 1;
        None
    }

    /// Store the corrected text for `key`, evicting low-score entries
    /// first if the budget would overflow
    pub fn set(&self, key: &str, value: &str) {
        let hash = content_hash(key);
        let entry = CacheEntry::new(value.to_string());
        let now = Utc::now();
        let mut inner = self.inner.lock();
        // Replacing an entry frees its old size before the space check.
        inner.entries.remove(&hash);
        inner.ensure_space(entry.size, now);
        inner.entries.insert(hash, entry);
    }

    /// Remove the entry for `key`; returns whether one existed
    pub fn remove(&self, key: &str) -> bool {
        let hash = content_hash(key);
        self.inner.lock().entries.remove(&hash).is_some()
    }

    /// Whether a live (non-expired) entry exists for `key`
    pub fn has(&self, key: &str) -> bool {
        let hash = content_hash(key);
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let max_age = inner.config.max_age;
        let expired = inner
            .entries
            .get(&hash)
            .is_some_and(|entry| entry.is_expired(max_age, now));
        if expired {
            inner.entries.remove(&hash);
            return false;
        }
        inner.entries.contains_key(&hash)
    }

    /// Drop all entries and reset the hit/miss counters
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    /// Sweep expired entries; returns how many were removed. Intended
    /// to be invoked periodically by the host.
    pub fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let max_age = inner.config.max_age;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(max_age, now));
        before - inner.entries.len()
    }

    /// Current statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let total = inner.hits + inner.misses;
        CacheStats {
            size: inner.total_size(),
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                inner.hits as f64 / total as f64
            },
            oldest_entry: inner.entries.values().map(|e| e.timestamp).min(),
            newest_entry: inner.entries.values().map(|e| e.timestamp).max(),
        }
    }

    /// The most-read entries, as (key-prefix, hits) pairs
    pub fn top_entries(&self, limit: usize) -> Vec<(String, u64)> {
        let inner = self.inner.lock();
        let mut ranked: Vec<(String, u64)> = inner
            .entries
            .iter()
            .map(|(hash, entry)| (hash[..16.min(hash.len())].to_string(), entry.hits))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }

    /// Store several corrections at once
    pub fn preload<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in entries {
            self.set(&key, &value);
        }
    }

    /// Adjust the budget or lifetime; existing entries are re-judged
    /// against the new limits on their next access
    pub fn configure(&self, max_size: Option<usize>, max_age: Option<std::time::Duration>) {
        let mut inner = self.inner.lock();
        if let Some(max_size) = max_size {
            inner.config.max_size = max_size;
        }
        if let Some(max_age) = max_age {
            inner.config.max_age = max_age;
        }
    }

    /// Export the cache as a JSON document
    pub fn export(&self) -> crate::error::MendResult<String> {
        let inner = self.inner.lock();
        let snapshot = CacheSnapshot {
            cache: inner
                .entries
                .iter()
                .map(|(hash, entry)| (hash.clone(), entry.clone()))
                .collect(),
            stats: SnapshotStats {
                hits: inner.hits,
                misses: inner.misses,
            },
            timestamp: Utc::now(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuild the cache from an exported JSON document. Fails closed:
    /// malformed input leaves the existing state untouched and returns
    /// false.
    pub fn import(&self, json: &str) -> bool {
        let snapshot: CacheSnapshot = match serde_json::from_str(json) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "cache import rejected");
                return false;
            }
        };
        let mut inner = self.inner.lock();
        inner.entries = snapshot.cache.into_iter().collect();
        inner.hits = snapshot.stats.hits;
        inner.misses = snapshot.stats.misses;
        true
    }
}

impl Default for CorrectionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
