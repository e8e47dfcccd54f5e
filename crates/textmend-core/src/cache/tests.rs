//! Cache tests

use super::*;
use std::time::Duration;

fn small_cache(max_size: usize) -> CorrectionCache {
    CorrectionCache::new(CacheConfig {
        max_size,
        max_age: Duration::from_secs(60),
    })
}

#[test]
fn set_then_get_round_trips() {
    let cache = CorrectionCache::default();
    cache.set("Bonjour", "Bonjour !");
    assert_eq!(cache.get("Bonjour").as_deref(), Some("Bonjour !"));
}

#[test]
fn miss_on_absent_key() {
    let cache = CorrectionCache::default();
    assert_eq!(cache.get("never stored"), None);
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
}

#[test]
fn expired_entries_read_as_misses() {
    let cache = CorrectionCache::new(CacheConfig {
        max_size: 1024,
        max_age: Duration::from_millis(40),
    });
    cache.set("key", "value");
    assert_eq!(cache.get("key").as_deref(), Some("value"));
    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(cache.get("key"), None);
    let stats = cache.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.misses, 1);
}

#[test]
fn eviction_respects_budget_and_scores() {
    let cache = small_cache(100);
    let forty_bytes = "x".repeat(40);
    cache.set("first", &forty_bytes);
    cache.set("second", &forty_bytes);

    // Reads raise the first entry's hits-per-age score above zero.
    cache.get("first");
    cache.get("first");

    cache.set("third", &forty_bytes);

    let stats = cache.stats();
    assert!(stats.size <= 100);
    assert_eq!(cache.get("first").as_deref(), Some(forty_bytes.as_str()));
    assert_eq!(cache.get("third").as_deref(), Some(forty_bytes.as_str()));
    assert_eq!(cache.get("second"), None);
}

#[test]
fn oversized_inserts_never_leave_cache_over_budget() {
    let cache = small_cache(64);
    for index in 0..20 {
        cache.set(&format!("key-{index}"), &"y".repeat(16));
        assert!(cache.stats().size <= 64);
    }
}

#[test]
fn replacing_a_key_frees_its_old_size() {
    let cache = small_cache(50);
    cache.set("key", &"a".repeat(40));
    cache.set("key", &"b".repeat(40));
    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.size, 40);
}

#[test]
fn clear_drops_entries_and_counters() {
    let cache = CorrectionCache::default();
    cache.set("key", "value");
    cache.get("key");
    cache.get("missing");
    cache.clear();
    let stats = cache.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.hit_rate, 0.0);
}

#[test]
fn cleanup_reports_removed_count() {
    let cache = CorrectionCache::new(CacheConfig {
        max_size: 1024,
        max_age: Duration::from_millis(20),
    });
    cache.set("one", "1");
    cache.set("two", "2");
    std::thread::sleep(Duration::from_millis(50));
    cache.set("three", "3");
    assert_eq!(cache.cleanup(), 2);
    assert!(cache.has("three"));
}

#[test]
fn stats_track_hit_rate_and_ages() {
    let cache = CorrectionCache::default();
    cache.set("key", "value");
    cache.get("key");
    cache.get("key");
    cache.get("absent");
    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    assert!(stats.oldest_entry.is_some());
    assert_eq!(stats.oldest_entry, stats.newest_entry);
}

#[test]
fn top_entries_rank_by_hits() {
    let cache = CorrectionCache::default();
    cache.set("popular", "a");
    cache.set("rare", "b");
    cache.get("popular");
    cache.get("popular");
    cache.get("rare");
    let top = cache.top_entries(1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].1, 2);
    assert_eq!(top[0].0.len(), 16);
}

#[test]
fn export_import_round_trips() {
    let cache = CorrectionCache::default();
    cache.set("alpha", "corrected alpha");
    cache.set("beta", "corrected beta");
    cache.get("alpha");
    cache.get("missing");
    let exported = cache.export().expect("export serializes");

    let restored = CorrectionCache::default();
    assert!(restored.import(&exported));
    assert_eq!(restored.get("alpha").as_deref(), Some("corrected alpha"));
    assert_eq!(restored.get("beta").as_deref(), Some("corrected beta"));
}

#[test]
fn export_shape_is_pinned() {
    let cache = CorrectionCache::default();
    cache.set("alpha", "corrected alpha");
    let exported = cache.export().expect("export serializes");
    let value: serde_json::Value = serde_json::from_str(&exported).expect("export is json");

    let entries = value["cache"].as_array().expect("cache array");
    assert_eq!(entries.len(), 1);
    let hash = entries[0][0].as_str().expect("hash key");
    assert_eq!(hash.len(), 64);
    assert!(entries[0][1]["timestamp"].is_i64());
    assert_eq!(entries[0][1]["value"], "corrected alpha");
    assert!(value["stats"]["hits"].is_u64() || value["stats"]["hits"].is_i64());
    assert!(value["timestamp"].is_i64());
}

#[test]
fn import_fails_closed_on_malformed_payload() {
    let cache = CorrectionCache::default();
    cache.set("keep", "me");
    assert!(!cache.import("not json at all"));
    assert!(!cache.import("{\"cache\": 42}"));
    assert_eq!(cache.get("keep").as_deref(), Some("me"));
}

#[test]
fn remove_and_has() {
    let cache = CorrectionCache::default();
    cache.set("key", "value");
    assert!(cache.has("key"));
    assert!(cache.remove("key"));
    assert!(!cache.has("key"));
    assert!(!cache.remove("key"));
}

#[test]
fn content_hash_is_stable_and_hex() {
    let first = content_hash("same input");
    let second = content_hash("same input");
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, content_hash("different input"));
}
