use anyhow::Context;

use redscout_core::AppConfig;
use redscout_reddit::{RedditAuth, RedditClient};

/// Builds a read-only API client from the application-only client-credentials
/// grant. No user account is involved.
pub(crate) async fn app_client(config: &AppConfig) -> anyhow::Result<RedditClient> {
    let auth = RedditAuth::new(
        &config.reddit_client_id,
        &config.reddit_client_secret,
        &config.redirect_uri,
        &config.user_agent,
        config.request_timeout_secs,
    )?;
    let access_token = auth
        .exchange_app_credentials()
        .await
        .context("application-only token exchange failed")?;
    Ok(RedditClient::new(
        &access_token,
        &config.user_agent,
        config.request_timeout_secs,
    )?)
}
