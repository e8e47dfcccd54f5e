//! Cache entry, configuration, and statistics types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One cached correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached corrected text
    pub value: String,
    /// When the entry was created (milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Number of times this entry has been read
    pub hits: u64,
    /// Size of the value in bytes
    pub size: usize,
}

impl CacheEntry {
    /// Create a fresh entry for `value`
    pub fn new(value: String) -> Self {
        let size = value.len();
        Self {
            value,
            timestamp: Utc::now(),
            hits: 0,
            size,
        }
    }

    /// Whether the entry is older than `max_age` as of `now`
    pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp)
            .to_std()
            .map(|age| age > max_age)
            .unwrap_or(false)
    }

    /// Hits-per-age eviction score; the lowest-scoring entry goes
    /// first. A zero age counts as one millisecond so fresh entries
    /// never divide by zero.
    pub fn score(&self, now: DateTime<Utc>) -> f64 {
        let age_ms = now
            .signed_duration_since(self.timestamp)
            .num_milliseconds()
            .max(1);
        self.hits as f64 / age_ms as f64
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total value-size budget in bytes
    pub max_size: usize,
    /// Entry lifetime
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024, // 10 MiB
            max_age: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
        }
    }
}

/// Cache statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total size of stored values in bytes
    pub size: usize,
    /// Number of live entries
    pub entries: usize,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any access
    pub hit_rate: f64,
    /// Creation time of the oldest entry
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Creation time of the newest entry
    pub newest_entry: Option<DateTime<Utc>>,
}
