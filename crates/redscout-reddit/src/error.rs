use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the Reddit API client.
///
/// HTTP statuses are classified into the variants the scan controllers key
/// their skip behavior on: a missing or private subreddit is not the same
/// failure as an exhausted rate-limit window, even though both end a single
/// item rather than a whole scan.
#[derive(Debug, Error)]
pub enum RedditError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 404: the subreddit or post does not exist.
    #[error("not found")]
    NotFound,

    /// HTTP 403: the subreddit is private, quarantined, or banned.
    #[error("forbidden")]
    Forbidden,

    /// HTTP 400: the request was malformed (typically a bad subreddit name).
    #[error("bad request")]
    BadRequest,

    /// HTTP 401: the access token is missing, expired, or revoked.
    #[error("unauthorized")]
    Unauthorized,

    /// HTTP 429: the API's request-rate ceiling was hit. Never retried here;
    /// surfaced like any other per-item failure.
    #[error("rate limited")]
    RateLimited,

    /// Any other non-2xx HTTP status.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// OAuth token exchange or identity lookup failed.
    #[error("Reddit authentication failed: {0}")]
    Auth(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Maps a non-success HTTP status to the matching [`RedditError`] variant.
pub(crate) fn classify_status(status: StatusCode) -> RedditError {
    match status {
        StatusCode::BAD_REQUEST => RedditError::BadRequest,
        StatusCode::UNAUTHORIZED => RedditError::Unauthorized,
        StatusCode::FORBIDDEN => RedditError::Forbidden,
        StatusCode::NOT_FOUND => RedditError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => RedditError::RateLimited,
        other => RedditError::UnexpectedStatus(other.as_u16()),
    }
}

impl RedditError {
    /// True for the error classes that skip a single subreddit in a signal
    /// scan with a user-visible warning rather than a logged failure.
    #[must_use]
    pub fn is_subreddit_skip(&self) -> bool {
        matches!(
            self,
            RedditError::NotFound | RedditError::Forbidden | RedditError::BadRequest
        )
    }
}
