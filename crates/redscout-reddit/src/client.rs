//! The authenticated Reddit read client.
//!
//! All methods hit `oauth.reddit.com` with a bearer token obtained through
//! [`crate::RedditAuth`]. Listings are paginated with the API's `after`
//! cursor, at most 100 items per page, until the requested limit is met or
//! the listing is exhausted. No request is ever retried; rate-limit
//! responses surface as [`RedditError::RateLimited`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::{classify_status, RedditError};
use crate::normalize::{normalize_comment, normalize_post, normalize_subreddit};
use crate::types::{CommentData, IdentityResponse, Listing, PostData, SubredditData, Thing};
use crate::{Comment, Post, Subreddit};

const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com/";
const PAGE_SIZE: u32 = 100;

/// Read client bound to one access token.
pub struct RedditClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl RedditClient {
    /// Creates a client pointed at the production API host.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, RedditError> {
        Self::with_base_url(access_token, user_agent, timeout_secs, DEFAULT_API_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the client cannot be constructed, or
    /// [`RedditError::Auth`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, RedditError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RedditError::Auth(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            token: access_token.to_owned(),
            base_url,
        })
    }

    /// Returns the authenticated user's account name.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Unauthorized`] when the token is expired or
    /// revoked, or another classified error on failure.
    pub async fn me(&self) -> Result<String, RedditError> {
        let url = self.endpoint("api/v1/me")?;
        let identity: IdentityResponse = self.get_json(url, &[]).await?;
        Ok(identity.name)
    }

    /// Searches communities by name and description.
    ///
    /// # Errors
    ///
    /// Returns a classified [`RedditError`] on HTTP failure or an
    /// unparseable listing.
    pub async fn search_subreddits(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Subreddit>, RedditError> {
        let url = self.endpoint("subreddits/search")?;
        let pages = self
            .paginate::<SubredditData>(url, &[("q", query)], limit)
            .await?;
        Ok(pages.into_iter().map(normalize_subreddit).collect())
    }

    /// Searches posts platform-wide with the given sort mode and recency
    /// window (`hour`/`day`/`week`/`month`/`year`/`all`).
    ///
    /// # Errors
    ///
    /// Returns a classified [`RedditError`] on HTTP failure or an
    /// unparseable listing.
    pub async fn search_posts(
        &self,
        query: &str,
        sort: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<Post>, RedditError> {
        let url = self.endpoint("search")?;
        let pages = self
            .paginate::<PostData>(
                url,
                &[
                    ("q", query),
                    ("sort", sort),
                    ("t", time_filter),
                    ("restrict_sr", "false"),
                    ("type", "link"),
                ],
                limit,
            )
            .await?;
        Ok(pages.into_iter().map(normalize_post).collect())
    }

    /// Lists a community's top posts for a time window.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::NotFound`] / [`RedditError::Forbidden`] /
    /// [`RedditError::BadRequest`] for missing, private, or badly named
    /// subreddits, or another classified error on failure.
    pub async fn top_posts(
        &self,
        subreddit: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<Post>, RedditError> {
        let url = self.endpoint(&format!("r/{subreddit}/top"))?;
        let pages = self
            .paginate::<PostData>(url, &[("t", time_filter)], limit)
            .await?;
        Ok(pages.into_iter().map(normalize_post).collect())
    }

    /// Fetches up to `limit` comments for a post, flattened depth-first.
    ///
    /// Deferred subtrees (`more` stubs) are skipped, not expanded: one
    /// request per post, never a crawl.
    ///
    /// # Errors
    ///
    /// Returns a classified [`RedditError`] on HTTP failure or an
    /// unparseable comment tree.
    pub async fn comments(
        &self,
        subreddit: &str,
        article: &str,
        limit: u32,
    ) -> Result<Vec<Comment>, RedditError> {
        let url = self.endpoint(&format!("r/{subreddit}/comments/{article}"))?;
        let limit_param = limit.min(500).to_string();
        let body: serde_json::Value = self
            .get_json(url.clone(), &[("limit", limit_param.as_str())])
            .await?;

        // The comments endpoint returns a two-element array: the post
        // listing, then the comment listing.
        let comment_listing = body
            .as_array()
            .and_then(|parts| parts.get(1))
            .cloned()
            .ok_or_else(|| RedditError::Deserialize {
                context: url.to_string(),
                source: serde::de::Error::custom("expected [post, comments] array"),
            })?;

        let mut comments = Vec::new();
        flatten_comment_tree(&comment_listing, limit as usize, &mut comments)?;
        Ok(comments)
    }

    fn endpoint(&self, path: &str) -> Result<Url, RedditError> {
        self.base_url
            .join(path)
            .map_err(|e| RedditError::Auth(format!("invalid endpoint path '{path}': {e}")))
    }

    /// Walks a listing with the `after` cursor until `limit` items are
    /// collected or the listing ends.
    async fn paginate<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
        limit: u32,
    ) -> Result<Vec<T>, RedditError> {
        let mut collected: Vec<T> = Vec::new();
        let mut after: Option<String> = None;

        while (collected.len() as u32) < limit {
            let remaining = limit - collected.len() as u32;
            let page_size = remaining.min(PAGE_SIZE).to_string();

            let mut query: Vec<(&str, &str)> = params.to_vec();
            query.push(("limit", page_size.as_str()));
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }

            let listing: Listing<T> = self.get_json(url.clone(), &query).await?;
            let page_len = listing.data.children.len();
            tracing::debug!(%url, page_len, collected = collected.len(), "fetched listing page");
            collected.extend(listing.data.children.into_iter().map(|thing| thing.data));

            after = listing.data.after;
            if after.is_none() || page_len == 0 {
                break;
            }
        }

        collected.truncate(limit as usize);
        Ok(collected)
    }

    /// Sends a GET request, classifies non-2xx statuses, and parses the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, RedditError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RedditError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Depth-first walk over a comment listing, collecting `t1` nodes and
/// descending into their reply listings.
fn flatten_comment_tree(
    listing: &serde_json::Value,
    limit: usize,
    out: &mut Vec<Comment>,
) -> Result<(), RedditError> {
    let Some(children) = listing
        .get("data")
        .and_then(|d| d.get("children"))
        .and_then(serde_json::Value::as_array)
    else {
        return Ok(());
    };

    for child in children {
        if out.len() >= limit {
            return Ok(());
        }

        let thing: Thing<CommentData> = match serde_json::from_value(child.clone()) {
            Ok(thing) => thing,
            // `more` stubs and unknown kinds need not parse as comments.
            Err(_) => continue,
        };
        if thing.kind != "t1" {
            continue;
        }

        let replies = thing.data.replies.clone();
        if let Some(comment) = normalize_comment(thing.data) {
            out.push(comment);
        }

        if replies.is_object() {
            flatten_comment_tree(&replies, limit, out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> RedditClient {
        RedditClient::with_base_url("test-token", "redscout-test/0.1", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_joins_relative_paths() {
        let client = test_client("https://oauth.reddit.com");
        let url = client.endpoint("subreddits/search").unwrap();
        assert_eq!(url.as_str(), "https://oauth.reddit.com/subreddits/search");
    }

    #[test]
    fn endpoint_strips_trailing_slash_from_base() {
        let client = test_client("https://oauth.reddit.com/");
        let url = client.endpoint("r/startups/top").unwrap();
        assert_eq!(url.as_str(), "https://oauth.reddit.com/r/startups/top");
    }

    #[test]
    fn flatten_collects_nested_replies_depth_first() {
        let listing = serde_json::json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "body": "top level",
                            "author": "alice",
                            "permalink": "/r/x/comments/1/a/c1",
                            "replies": {
                                "kind": "Listing",
                                "data": {
                                    "children": [
                                        {
                                            "kind": "t1",
                                            "data": {
                                                "body": "nested",
                                                "author": "bob",
                                                "permalink": "/r/x/comments/1/a/c2",
                                                "replies": ""
                                            }
                                        }
                                    ]
                                }
                            }
                        }
                    },
                    {
                        "kind": "more",
                        "data": { "count": 12, "children": ["abc"] }
                    },
                    {
                        "kind": "t1",
                        "data": {
                            "body": "second top level",
                            "author": "carol",
                            "permalink": "/r/x/comments/1/a/c3",
                            "replies": ""
                        }
                    }
                ]
            }
        });

        let mut out = Vec::new();
        flatten_comment_tree(&listing, 10, &mut out).unwrap();
        let bodies: Vec<&str> = out.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["top level", "nested", "second top level"]);
    }

    #[test]
    fn flatten_respects_the_limit() {
        let listing = serde_json::json!({
            "data": {
                "children": [
                    { "kind": "t1", "data": { "body": "one", "author": "a", "permalink": "/1", "replies": "" } },
                    { "kind": "t1", "data": { "body": "two", "author": "b", "permalink": "/2", "replies": "" } },
                    { "kind": "t1", "data": { "body": "three", "author": "c", "permalink": "/3", "replies": "" } }
                ]
            }
        });

        let mut out = Vec::new();
        flatten_comment_tree(&listing, 2, &mut out).unwrap();
        assert_eq!(out.len(), 2);
    }
}
