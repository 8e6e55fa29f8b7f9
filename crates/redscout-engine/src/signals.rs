//! Signal scan controller.
//!
//! Scans each target subreddit's top posts for the configured window and
//! emits one [`SignalRecord`] per matching post (all matched keywords) and at
//! most one per matching comment (first keyword wins). Subreddits that cannot
//! be read are reported as skips; the scan always continues with the next.
//! Cancellation is checked at subreddit and comment-listing boundaries.

use tokio_util::sync::CancellationToken;

use redscout_reddit::{Post, RedditClient, RedditError};

use crate::session::ScanProgress;
use crate::types::{
    ScanStatus, SignalKind, SignalRecord, SignalReport, SignalScanParams, SkippedSubreddit,
};

/// Comment bodies are truncated to this many characters for display.
const COMMENT_TEXT_MAX: usize = 300;

/// Runs one signal scan to completion or to the first cancelled checkpoint.
/// `params` must already be validated.
pub async fn run_signal_scan(
    client: &RedditClient,
    params: &SignalScanParams,
    cancel: &CancellationToken,
    progress: &ScanProgress,
) -> SignalReport {
    let mut signals = Vec::new();
    let mut skipped = Vec::new();
    let total = params.subreddits.len();
    let mut cancelled = false;

    'subreddits: for (index, subreddit) in params.subreddits.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(completed = index, total, "signal scan cancelled between subreddits");
            cancelled = true;
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        progress.set(
            index as f32 / total as f32,
            format!("scanning r/{subreddit} ({}/{total})", index + 1),
        );

        let posts = match client
            .top_posts(subreddit, params.window.as_str(), params.post_limit)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                record_skip(&mut skipped, subreddit, &e);
                continue;
            }
        };

        for post in posts {
            if let Some(signal) = match_post(subreddit, &post, &params.keywords) {
                signals.push(signal);
            }

            if params.comment_limit == 0 {
                continue;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break 'subreddits;
            }

            match client
                .comments(subreddit, &post.id, params.comment_limit)
                .await
            {
                Ok(comments) => {
                    for comment in comments {
                        let Some(author) = comment.author else {
                            continue;
                        };
                        if let Some(keyword) = first_match(&comment.body, &params.keywords) {
                            signals.push(SignalRecord {
                                subreddit: subreddit.clone(),
                                kind: SignalKind::Comment,
                                matched: keyword.to_string(),
                                author,
                                text: truncate_text(&comment.body),
                                permalink: comment.permalink,
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        subreddit,
                        post_id = %post.id,
                        error = %e,
                        "comment fetch failed; continuing with next post"
                    );
                }
            }
        }
    }

    progress.set(1.0, "signal scan finished");
    SignalReport {
        signals,
        skipped,
        status: if cancelled {
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        },
    }
}

/// Matches a post against all keywords at once; any hit with a live author
/// yields one Post record listing every matched keyword in input order.
fn match_post(subreddit: &str, post: &Post, keywords: &[String]) -> Option<SignalRecord> {
    let haystack = format!("{} {}", post.title, post.body).to_lowercase();
    let matched: Vec<&str> = keywords
        .iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect();

    if matched.is_empty() {
        return None;
    }
    let author = post.author.clone()?;

    Some(SignalRecord {
        subreddit: subreddit.to_string(),
        kind: SignalKind::Post,
        matched: matched.join(", "),
        author,
        text: collapse_whitespace(&post.title),
        permalink: post.permalink.clone(),
    })
}

/// First keyword (in input order) contained in the text, case-insensitively.
fn first_match<'a>(text: &str, keywords: &'a [String]) -> Option<&'a str> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .find(|k| haystack.contains(&k.to_lowercase()))
        .map(String::as_str)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses newlines and truncates to the display limit with an ellipsis
/// marker, splitting only at character boundaries.
fn truncate_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= COMMENT_TEXT_MAX {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(COMMENT_TEXT_MAX).collect();
    format!("{truncated}...")
}

fn record_skip(skipped: &mut Vec<SkippedSubreddit>, subreddit: &str, error: &RedditError) {
    if error.is_subreddit_skip() {
        tracing::warn!(subreddit, error = %error, "skipping unreadable subreddit");
    } else {
        tracing::warn!(subreddit, error = %error, "subreddit scan failed; skipping");
    }
    skipped.push(SkippedSubreddit {
        subreddit: subreddit.to_string(),
        reason: error.to_string(),
    });
}
