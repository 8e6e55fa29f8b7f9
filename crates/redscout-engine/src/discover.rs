//! Discovery scan controller.
//!
//! For each query, in input order: a direct community search, a platform-wide
//! post search over the last month, and, when a comment depth is configured,
//! a bounded comment sweep per matching post. Every API failure along the way
//! is logged and skipped; nothing per-item aborts the run and nothing is
//! retried. Cancellation is checked between top-level queries and returns the
//! partial aggregate.

use tokio_util::sync::CancellationToken;

use redscout_reddit::RedditClient;

use crate::aggregate::Aggregator;
use crate::session::ScanProgress;
use crate::types::{DiscoveryParams, DiscoveryReport, Provenance, ScanStatus};

const POST_SEARCH_SORT: &str = "relevance";
const POST_SEARCH_WINDOW: &str = "month";

/// Runs one discovery scan to completion or to the first cancelled
/// checkpoint. `params` must already be validated.
pub async fn run_discovery(
    client: &RedditClient,
    params: &DiscoveryParams,
    cancel: &CancellationToken,
    progress: &ScanProgress,
) -> DiscoveryReport {
    let mut aggregator = Aggregator::new();
    let total = params.queries.len();
    let mut cancelled = false;

    for (index, query) in params.queries.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(completed = index, total, "discovery cancelled between queries");
            cancelled = true;
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        progress.set(
            index as f32 / total as f32,
            format!("searching \"{query}\" ({}/{total})", index + 1),
        );

        direct_search(client, query, params.direct_limit, &mut aggregator).await;
        post_search(client, query, params, &mut aggregator).await;
    }

    progress.set(1.0, "discovery finished");
    DiscoveryReport {
        communities: aggregator.into_ranked(),
        status: if cancelled {
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        },
    }
}

/// Direct name/description search; each hit carries DirectSearch provenance.
async fn direct_search(client: &RedditClient, query: &str, limit: u32, aggregator: &mut Aggregator) {
    match client.search_subreddits(query, limit).await {
        Ok(subreddits) => {
            for sub in subreddits {
                aggregator.merge(&sub.name, sub.subscribers, sub.over_18, Provenance::DirectSearch);
            }
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "direct subreddit search failed; continuing");
        }
    }
}

/// Platform-wide post search; each post's parent community gets RelevantPost
/// provenance, upgraded to RelevantComment when a comment echoes the query.
async fn post_search(
    client: &RedditClient,
    query: &str,
    params: &DiscoveryParams,
    aggregator: &mut Aggregator,
) {
    let posts = match client
        .search_posts(query, POST_SEARCH_SORT, POST_SEARCH_WINDOW, params.post_limit)
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::warn!(query, error = %e, "post search failed; continuing");
            return;
        }
    };

    for post in posts {
        aggregator.merge(
            &post.subreddit,
            post.subreddit_subscribers,
            post.over_18,
            Provenance::RelevantPost,
        );

        if params.comment_limit == 0 {
            continue;
        }

        match client
            .comments(&post.subreddit, &post.id, params.comment_limit)
            .await
        {
            Ok(comments) => {
                let needle = query.to_lowercase();
                // First comment echoing the query is enough; stop scanning
                // this post's comments once one is found.
                let echoed = comments
                    .iter()
                    .any(|c| c.body.to_lowercase().contains(&needle));
                if echoed {
                    aggregator.merge(
                        &post.subreddit,
                        post.subreddit_subscribers,
                        post.over_18,
                        Provenance::RelevantComment,
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    query,
                    subreddit = %post.subreddit,
                    post_id = %post.id,
                    error = %e,
                    "comment fetch failed; continuing with next post"
                );
            }
        }
    }
}
