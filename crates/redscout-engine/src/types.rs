//! Domain types for discovery and signal scans.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a community match was surfaced during discovery. Weights are fixed;
/// a community found several ways scores the sum of its distinct tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provenance {
    DirectSearch,
    RelevantPost,
    RelevantComment,
}

impl Provenance {
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Provenance::DirectSearch => 1,
            Provenance::RelevantPost => 2,
            Provenance::RelevantComment => 3,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Provenance::DirectSearch => "Direct Search",
            Provenance::RelevantPost => "Relevant Post",
            Provenance::RelevantComment => "Relevant Comment",
        }
    }
}

/// A unique community discovered within one scan session.
///
/// Created on first match; subsequent matches for the same name only grow
/// `found_via`. The member count is taken from the first observation and
/// never refreshed within the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityRecord {
    pub name: String,
    pub members: u64,
    pub found_via: BTreeSet<Provenance>,
}

impl CommunityRecord {
    /// Sum of the fixed weights of the distinct provenance tags present.
    /// No other input affects the score.
    #[must_use]
    pub fn relevance_score(&self) -> u32 {
        self.found_via.iter().map(|p| p.weight()).sum()
    }

    /// Sorted provenance labels joined for display and export.
    #[must_use]
    pub fn found_via_label(&self) -> String {
        self.found_via
            .iter()
            .map(|p| p.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn link(&self) -> String {
        format!("https://www.reddit.com/r/{}", self.name)
    }

    #[must_use]
    pub fn top_posts_link(&self) -> String {
        format!("https://www.reddit.com/r/{}/top/?t=month", self.name)
    }
}

/// Whether a buying signal came from a post or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Post,
    Comment,
}

impl SignalKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SignalKind::Post => "Post",
            SignalKind::Comment => "Comment",
        }
    }
}

/// One matching post or comment. Never merged or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalRecord {
    pub subreddit: String,
    pub kind: SignalKind,
    /// Matched keywords, joined with `", "` for posts; a single keyword for
    /// comments (first match wins).
    pub matched: String,
    pub author: String,
    pub text: String,
    pub permalink: String,
}

/// Recency window for top-post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => Err(ParamsError::InvalidTimeWindow(other.to_string())),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input validation failures, rejected before any API call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("please enter at least one search query")]
    NoQueries,

    #[error("please provide at least one subreddit to scan")]
    NoSubreddits,

    #[error("please provide at least one keyword")]
    NoKeywords,

    #[error("unknown time window '{0}'; expected day, week, month, year, or all")]
    InvalidTimeWindow(String),
}

/// Inputs for a discovery scan: free-text queries plus the three depth knobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveryParams {
    pub queries: Vec<String>,
    pub direct_limit: u32,
    pub post_limit: u32,
    pub comment_limit: u32,
}

impl DiscoveryParams {
    /// Trims entries, drops empties, and rejects an empty query list.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::NoQueries`] if no non-empty query remains.
    pub fn validated(mut self) -> Result<Self, ParamsError> {
        self.queries = self
            .queries
            .iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        if self.queries.is_empty() {
            return Err(ParamsError::NoQueries);
        }
        Ok(self)
    }
}

/// Inputs for a signal scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalScanParams {
    pub subreddits: Vec<String>,
    pub keywords: Vec<String>,
    pub window: TimeWindow,
    pub post_limit: u32,
    pub comment_limit: u32,
}

impl SignalScanParams {
    /// Trims entries, strips any leading `r/` from subreddit names, drops
    /// empties, and rejects empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::NoSubreddits`] or [`ParamsError::NoKeywords`].
    pub fn validated(mut self) -> Result<Self, ParamsError> {
        self.subreddits = self
            .subreddits
            .iter()
            .map(|s| {
                let trimmed = s.trim();
                trimmed
                    .strip_prefix("r/")
                    .unwrap_or(trimmed)
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty())
            .collect();
        self.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if self.subreddits.is_empty() {
            return Err(ParamsError::NoSubreddits);
        }
        if self.keywords.is_empty() {
            return Err(ParamsError::NoKeywords);
        }
        Ok(self)
    }
}

/// Lifecycle of one bounded scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    NotStarted,
    Running,
    Cancelled,
    Completed,
}

/// A subreddit the signal scan could not read, with a displayable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSubreddit {
    pub subreddit: String,
    pub reason: String,
}

/// Result of a discovery scan. On cancellation, `communities` holds what
/// accumulated from fully completed queries.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub communities: Vec<CommunityRecord>,
    pub status: ScanStatus,
}

/// Result of a signal scan, with per-subreddit skips reported alongside.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub signals: Vec<SignalRecord>,
    pub skipped: Vec<SkippedSubreddit>,
    pub status: ScanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_weights_are_fixed() {
        assert_eq!(Provenance::DirectSearch.weight(), 1);
        assert_eq!(Provenance::RelevantPost.weight(), 2);
        assert_eq!(Provenance::RelevantComment.weight(), 3);
    }

    #[test]
    fn found_via_label_is_sorted_and_comma_joined() {
        let record = CommunityRecord {
            name: "startups".to_string(),
            members: 1,
            found_via: [Provenance::RelevantComment, Provenance::DirectSearch]
                .into_iter()
                .collect(),
        };
        assert_eq!(record.found_via_label(), "Direct Search, Relevant Comment");
    }

    #[test]
    fn time_window_round_trips_through_from_str() {
        for window in [
            TimeWindow::Day,
            TimeWindow::Week,
            TimeWindow::Month,
            TimeWindow::Year,
            TimeWindow::All,
        ] {
            assert_eq!(window.as_str().parse::<TimeWindow>().unwrap(), window);
        }
        assert!(matches!(
            "fortnight".parse::<TimeWindow>(),
            Err(ParamsError::InvalidTimeWindow(_))
        ));
    }

    #[test]
    fn discovery_params_reject_blank_queries() {
        let params = DiscoveryParams {
            queries: vec!["  ".to_string(), String::new()],
            direct_limit: 10,
            post_limit: 25,
            comment_limit: 20,
        };
        assert_eq!(params.validated(), Err(ParamsError::NoQueries));
    }

    #[test]
    fn discovery_params_trim_queries() {
        let params = DiscoveryParams {
            queries: vec!["  SaaS for startups  ".to_string()],
            direct_limit: 10,
            post_limit: 25,
            comment_limit: 20,
        };
        let validated = params.validated().unwrap();
        assert_eq!(validated.queries, vec!["SaaS for startups"]);
    }

    #[test]
    fn signal_params_strip_subreddit_prefix() {
        let params = SignalScanParams {
            subreddits: vec!["r/sidehustle".to_string(), " solopreneur ".to_string()],
            keywords: vec!["market research".to_string()],
            window: TimeWindow::Month,
            post_limit: 50,
            comment_limit: 100,
        };
        let validated = params.validated().unwrap();
        assert_eq!(validated.subreddits, vec!["sidehustle", "solopreneur"]);
    }

    #[test]
    fn signal_params_reject_missing_inputs() {
        let base = SignalScanParams {
            subreddits: vec!["startups".to_string()],
            keywords: vec!["find clients".to_string()],
            window: TimeWindow::Week,
            post_limit: 10,
            comment_limit: 0,
        };

        let mut no_subs = base.clone();
        no_subs.subreddits.clear();
        assert_eq!(no_subs.validated(), Err(ParamsError::NoSubreddits));

        let mut no_keywords = base;
        no_keywords.keywords = vec!["  ".to_string()];
        assert_eq!(no_keywords.validated(), Err(ParamsError::NoKeywords));
    }
}
