//! Snapshot cache capability and in-memory store.

use std::time::{Duration, Instant};

use bytes::Bytes;
use compact_str::{CompactString, format_compact};
use dashmap::DashMap;

/// Cache key for a match snapshot.
pub fn snapshot_cache_key(match_id: i64) -> CompactString {
    format_compact!("match:{match_id}")
}

/// Key-value cache with per-entry TTL.
///
/// The read path only ever calls `get`; `set` is part of the capability
/// for external writers, so a hit may lag storage by up to the TTL the
/// writer chose. Nothing invalidates entries when the aggregate changes.
pub trait SnapshotCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn set(&self, key: &str, value: Bytes, ttl: Duration);
}

/// In-process `SnapshotCache` with lazy expiry: an entry is dropped when a
/// `get` finds it past its deadline.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<CompactString, CacheEntry>,
}

struct CacheEntry {
    payload: Bytes,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            // The read guard is out of scope here.
            self.entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        self.entries.insert(
            CompactString::from(key),
            CacheEntry {
                payload: value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_what_was_set() {
        let cache = MemoryCache::new();
        cache.set("match:42", Bytes::from_static(b"snapshot"), Duration::from_secs(60));
        assert_eq!(cache.get("match:42").unwrap(), Bytes::from_static(b"snapshot"));
        assert!(cache.get("match:43").is_none());
    }

    #[test]
    fn expired_entries_read_as_misses() {
        let cache = MemoryCache::new();
        cache.set("match:42", Bytes::from_static(b"stale"), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get("match:42").is_none());
    }

    #[test]
    fn set_overwrites_the_previous_entry() {
        let cache = MemoryCache::new();
        cache.set("match:42", Bytes::from_static(b"old"), Duration::from_secs(60));
        cache.set("match:42", Bytes::from_static(b"new"), Duration::from_secs(60));
        assert_eq!(cache.get("match:42").unwrap(), Bytes::from_static(b"new"));
    }

    #[test]
    fn key_format_is_stable() {
        assert_eq!(snapshot_cache_key(42), "match:42");
    }
}
