//! OAuth flows against Reddit's token endpoints.
//!
//! Two grants are used: `authorization_code` + `refresh_token` for the
//! dashboard (user context), and `client_credentials` for the CLI
//! (application-only read access). Token exchange is delegated entirely to
//! Reddit; failures surface as [`RedditError::Auth`].

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::RedditError;
use crate::types::TokenResponse;

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com/";
const OAUTH_SCOPES: &str = "identity read history";

/// Performs OAuth token exchanges for the configured Reddit application.
pub struct RedditAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    base_url: Url,
}

impl RedditAuth {
    /// Creates an auth handle pointed at the production token endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, RedditError> {
        Self::with_base_url(
            client_id,
            client_secret,
            redirect_uri,
            user_agent,
            timeout_secs,
            DEFAULT_AUTH_BASE_URL,
        )
    }

    /// Creates an auth handle with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Http`] if the client cannot be constructed, or
    /// [`RedditError::Auth`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
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
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            base_url,
        })
    }

    /// Builds the user-facing authorization URL for the permanent-duration
    /// code grant.
    ///
    /// `state` is echoed back on the callback and ties the grant to the
    /// dashboard session that initiated it.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path("api/v1/authorize");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("duration", "permanent")
            .append_pair("scope", OAUTH_SCOPES);
        url.into()
    }

    /// Exchanges a one-time authorization code for a long-lived refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Auth`] if the exchange is rejected or the
    /// response carries no refresh token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, RedditError> {
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;

        token
            .refresh_token
            .ok_or_else(|| RedditError::Auth("token response carried no refresh token".to_string()))
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Auth`] if the refresh token is expired or revoked.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, RedditError> {
        let token = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;
        Ok(token.access_token)
    }

    /// Obtains an application-only access token via the client-credentials
    /// grant. Read-only; no user identity attached.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError::Auth`] if the exchange fails.
    pub async fn exchange_app_credentials(&self) -> Result<String, RedditError> {
        let token = self
            .token_request(&[("grant_type", "client_credentials")])
            .await?;
        Ok(token.access_token)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, RedditError> {
        let url = self
            .base_url
            .join("api/v1/access_token")
            .map_err(|e| RedditError::Auth(format!("invalid token URL: {e}")))?;

        let response = self
            .client
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RedditError::Auth(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| RedditError::Auth(format!("token response parse error: {e}")))
    }
}
