//! Bounded, TTL-aware store for formatted lookup results.
//!
//! Every `get` and `insert` starts with a cleaning pass: expired entries are
//! dropped, then, if the map still exceeds its capacity, the soonest-to-expire
//! entries are evicted until the cap is met. Expiry is lazy; there is no
//! background task.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::dns::record::RecordKind;

/// Composite cache key: lowercased domain plus record kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    domain: String,
    kind: RecordKind,
}

impl CacheKey {
    /// Build a key, normalizing the domain to lowercase.
    pub fn new(domain: &str, kind: RecordKind) -> Self {
        Self {
            domain: domain.to_lowercase(),
            kind,
        }
    }
}

/// A cached record set and its expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Formatted result strings, in the order the response produced them.
    pub records: Vec<String>,
    /// Instant past which the entry no longer serves hits.
    pub expires_at: Instant,
    /// Insertion instant, kept for diagnostics only.
    pub inserted_at: Instant,
}

impl CacheEntry {
    /// Time left before expiry, saturating at zero.
    #[inline]
    pub fn remaining_ttl(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Time since insertion.
    #[inline]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }
}

/// Process-wide cache for resolved lookups.
///
/// A single mutex guards the whole map. Operations are short (a cleaning
/// pass plus one lookup or insert), so per-key locking buys nothing here.
/// The lock is never held across I/O.
pub struct LookupCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    max_entries: usize,
    default_ttl: Duration,
}

impl LookupCache {
    /// Create a cache with the given capacity and fallback TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            default_ttl,
        }
    }

    /// Look up a record set. Runs the cleaning pass first, so an expired
    /// entry is never returned.
    pub fn get(&self, domain: &str, kind: RecordKind) -> Option<CacheEntry> {
        let key = CacheKey::new(domain, kind);
        let now = Instant::now();

        let mut entries = self.entries.lock();
        Self::clean(&mut entries, self.max_entries, now);
        entries.get(&key).cloned()
    }

    /// Insert or overwrite a record set. Runs the cleaning pass first.
    ///
    /// When `ttl` is `None` the configured default applies.
    pub fn insert(
        &self,
        domain: &str,
        kind: RecordKind,
        records: Vec<String>,
        ttl: Option<Duration>,
    ) {
        let key = CacheKey::new(domain, kind);
        let now = Instant::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            records,
            expires_at: now + ttl,
            inserted_at: now,
        };

        let mut entries = self.entries.lock();
        Self::clean(&mut entries, self.max_entries, now);
        entries.insert(key, entry);
    }

    /// Number of stored entries, counted without a cleaning pass.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop expired entries, then evict in ascending `expires_at` order
    /// until the map fits the capacity again.
    fn clean(entries: &mut HashMap<CacheKey, CacheEntry>, max_entries: usize, now: Instant) {
        entries.retain(|_, entry| entry.expires_at > now);

        if entries.len() > max_entries {
            let mut by_expiry: Vec<(CacheKey, Instant)> = entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.expires_at))
                .collect();
            by_expiry.sort_by_key(|(_, expires_at)| *expires_at);

            let excess = entries.len() - max_entries;
            for (key, _) in by_expiry.into_iter().take(excess) {
                entries.remove(&key);
            }
        }
    }
}
