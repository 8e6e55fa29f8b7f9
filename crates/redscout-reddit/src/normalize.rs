//! Normalization of Reddit wire types into the domain types consumed by the
//! scan controllers.

use crate::types::{CommentData, PostData, SubredditData};

const PERMALINK_BASE: &str = "https://reddit.com";

/// A community surfaced by subreddit search.
#[derive(Debug, Clone)]
pub struct Subreddit {
    pub name: String,
    pub subscribers: u64,
    pub over_18: bool,
}

/// A post surfaced by search or a top listing.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub body: String,
    /// `None` when the account is deleted.
    pub author: Option<String>,
    pub permalink: String,
    pub subreddit_subscribers: u64,
    pub over_18: bool,
}

/// A single comment from a flattened comment tree.
#[derive(Debug, Clone)]
pub struct Comment {
    pub body: String,
    /// `None` when the account is deleted.
    pub author: Option<String>,
    pub permalink: String,
}

/// Maps the deleted-account sentinel (and empty strings) to `None`.
fn clean_author(author: Option<String>) -> Option<String> {
    author.filter(|a| !a.is_empty() && a != "[deleted]")
}

/// Joins a site-relative permalink onto the public host.
fn absolute_permalink(permalink: &str) -> String {
    if permalink.starts_with("http") {
        permalink.to_string()
    } else {
        format!("{PERMALINK_BASE}{permalink}")
    }
}

pub(crate) fn normalize_subreddit(data: SubredditData) -> Subreddit {
    Subreddit {
        name: data.display_name,
        subscribers: data.subscribers,
        over_18: data.over18,
    }
}

pub(crate) fn normalize_post(data: PostData) -> Post {
    Post {
        id: data.id,
        subreddit: data.subreddit,
        title: data.title,
        body: data.selftext,
        author: clean_author(data.author),
        permalink: absolute_permalink(&data.permalink),
        subreddit_subscribers: data.subreddit_subscribers,
        over_18: data.over_18,
    }
}

/// Converts a comment node into a [`Comment`], or `None` for `more` stubs
/// (no body).
pub(crate) fn normalize_comment(data: CommentData) -> Option<Comment> {
    let body = data.body?;
    Some(Comment {
        body,
        author: clean_author(data.author),
        permalink: absolute_permalink(data.permalink.as_deref().unwrap_or("")),
    })
}
