//! Community aggregation and ranking.
//!
//! Discovery merges every API hit into one record per community name,
//! growing the provenance set monotonically within a scan session. Filtering
//! happens before insertion: user-profile pseudo-communities and
//! adult-flagged content never enter the result set.

use std::collections::BTreeMap;

use crate::types::{CommunityRecord, Provenance};

/// Prefix of the user-profile namespace (`u_username` subreddits).
const PROFILE_PREFIX: &str = "u_";

/// Merges community matches keyed by name for a single scan session.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: BTreeMap<String, CommunityRecord>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one community match.
    ///
    /// The first observation creates the record and fixes the member count
    /// for the rest of the session; later matches only add provenance.
    /// Profile-namespace names and adult-flagged communities are dropped
    /// before insertion.
    pub fn merge(&mut self, name: &str, members: u64, over_18: bool, provenance: Provenance) {
        if Self::is_excluded(name, over_18) {
            return;
        }

        self.records
            .entry(name.to_string())
            .or_insert_with(|| CommunityRecord {
                name: name.to_string(),
                members,
                found_via: std::collections::BTreeSet::new(),
            })
            .found_via
            .insert(provenance);
    }

    fn is_excluded(name: &str, over_18: bool) -> bool {
        over_18 || name.to_ascii_lowercase().starts_with(PROFILE_PREFIX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Finalizes the session into a ranked list: relevance score descending,
    /// member count descending, community name ascending as the tie-break.
    #[must_use]
    pub fn into_ranked(self) -> Vec<CommunityRecord> {
        let mut records: Vec<CommunityRecord> = self.records.into_values().collect();
        records.sort_by(|a, b| {
            b.relevance_score()
                .cmp(&a.relevance_score())
                .then_with(|| b.members.cmp(&a.members))
                .then_with(|| a.name.cmp(&b.name))
        });
        records
    }
}
