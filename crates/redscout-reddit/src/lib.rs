//! HTTP client for the Reddit read API.
//!
//! Wraps `reqwest` with Reddit-specific error classification, OAuth token
//! exchange, and typed listing deserialization. The client only issues read
//! requests: subreddit search, platform-wide post search, top-post listings,
//! and flattened comment trees.

mod auth;
mod client;
mod error;
mod normalize;
mod types;

pub use auth::RedditAuth;
pub use client::RedditClient;
pub use error::RedditError;
pub use normalize::{Comment, Post, Subreddit};
