//! TTL cache for discovery results.
//!
//! Keyed by the exact request (the ordered query list plus all three depth
//! parameters), so only an identical re-submission is served from cache. An
//! optimization only; owned and injected by the caller, never ambient.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::{CommunityRecord, DiscoveryParams};

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    communities: Vec<CommunityRecord>,
}

/// Process-wide memoization of completed discovery scans.
#[derive(Debug)]
pub struct DiscoveryCache {
    ttl: Duration,
    entries: Mutex<HashMap<DiscoveryParams, CacheEntry>>,
}

impl DiscoveryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for an identical request, evicting it first
    /// if the validity window has passed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, params: &DiscoveryParams) -> Option<Vec<CommunityRecord>> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(params) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                Some(entry.communities.clone())
            }
            Some(_) => {
                entries.remove(params);
                None
            }
            None => None,
        }
    }

    /// Stores a completed scan's result. Cancelled partial results should
    /// not be inserted; that is the caller's responsibility.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, params: DiscoveryParams, communities: Vec<CommunityRecord>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            params,
            CacheEntry {
                stored_at: Instant::now(),
                communities,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use std::collections::BTreeSet;

    fn params(queries: &[&str], comment_limit: u32) -> DiscoveryParams {
        DiscoveryParams {
            queries: queries.iter().map(ToString::to_string).collect(),
            direct_limit: 10,
            post_limit: 25,
            comment_limit,
        }
    }

    fn record(name: &str) -> CommunityRecord {
        CommunityRecord {
            name: name.to_string(),
            members: 42,
            found_via: BTreeSet::from([Provenance::DirectSearch]),
        }
    }

    #[test]
    fn identical_request_hits_the_cache() {
        let cache = DiscoveryCache::new(Duration::from_secs(3600));
        cache.insert(params(&["saas"], 20), vec![record("startups")]);

        let hit = cache.get(&params(&["saas"], 20)).expect("cache hit");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "startups");
    }

    #[test]
    fn different_depths_miss_the_cache() {
        let cache = DiscoveryCache::new(Duration::from_secs(3600));
        cache.insert(params(&["saas"], 20), vec![record("startups")]);
        assert!(cache.get(&params(&["saas"], 0)).is_none());
    }

    #[test]
    fn query_order_is_part_of_the_key() {
        let cache = DiscoveryCache::new(Duration::from_secs(3600));
        cache.insert(params(&["a", "b"], 20), vec![record("startups")]);
        assert!(cache.get(&params(&["b", "a"], 20)).is_none());
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = DiscoveryCache::new(Duration::ZERO);
        cache.insert(params(&["saas"], 20), vec![record("startups")]);
        assert!(cache.get(&params(&["saas"], 20)).is_none());
    }
}
