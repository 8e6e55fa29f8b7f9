//! Reddit API wire types.
//!
//! The API wraps every listing in a `{"kind": "Listing", "data": {...}}`
//! envelope whose children are themselves `{"kind": "t3", "data": {...}}`
//! "things". Only the fields the scan controllers consume are modeled;
//! everything else is ignored by serde.

use serde::Deserialize;

/// A paginated listing envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub(crate) data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    pub(crate) children: Vec<Thing<T>>,
    /// Cursor for the next page; `None` when the listing is exhausted.
    #[serde(default)]
    pub(crate) after: Option<String>,
}

/// A typed `{"kind": ..., "data": ...}` wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    #[serde(default)]
    pub(crate) kind: String,
    pub(crate) data: T,
}

/// Subreddit fields from `/subreddits/search`.
#[derive(Debug, Deserialize)]
pub(crate) struct SubredditData {
    pub(crate) display_name: String,
    #[serde(default)]
    pub(crate) subscribers: u64,
    /// Adult-content flag; the API spells this `over18` on subreddits.
    #[serde(default)]
    pub(crate) over18: bool,
}

/// Post fields from `/search` and `/r/{sub}/top`.
#[derive(Debug, Deserialize)]
pub(crate) struct PostData {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) selftext: String,
    #[serde(default)]
    pub(crate) author: Option<String>,
    pub(crate) permalink: String,
    pub(crate) subreddit: String,
    #[serde(default)]
    pub(crate) subreddit_subscribers: u64,
    /// Adult-content flag; spelled `over_18` on posts.
    #[serde(default)]
    pub(crate) over_18: bool,
}

/// Comment fields from `/r/{sub}/comments/{article}`.
///
/// `more` stubs (deferred subtrees) appear in the same listing with no
/// `body`; they are skipped during flattening, never fetched.
#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    #[serde(default)]
    pub(crate) body: Option<String>,
    #[serde(default)]
    pub(crate) author: Option<String>,
    #[serde(default)]
    pub(crate) permalink: Option<String>,
    /// Nested replies: another listing, or the empty string when absent.
    #[serde(default)]
    pub(crate) replies: serde_json::Value,
}

/// OAuth token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
}

/// `/api/v1/me` response.
#[derive(Debug, Deserialize)]
pub(crate) struct IdentityResponse {
    pub(crate) name: String,
}
