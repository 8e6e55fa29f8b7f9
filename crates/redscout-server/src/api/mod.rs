mod auth;
mod discovery;
mod signals;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use redscout_core::{builtin_presets, load_presets, AppConfig, ScanPreset};
use redscout_engine::{
    DiscoveryCache, DiscoveryReport, ScanHandle, ScanSlot, ScanStatus, SignalReport,
};
use redscout_reddit::{RedditAuth, RedditClient, RedditError};

use crate::middleware::{request_id, require_session, RequestId};
use crate::session::SessionStore;

/// Slot plus latest-result store for one scan type.
#[derive(Debug)]
pub struct ScanState<T> {
    pub slot: ScanSlot,
    pub results: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for ScanState<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            results: Arc::clone(&self.results),
        }
    }
}

impl<T> Default for ScanState<T> {
    fn default() -> Self {
        Self {
            slot: ScanSlot::new(),
            results: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Clone> ScanState<T> {
    pub fn store(&self, report: T) {
        *self.results.lock().expect("results lock poisoned") = Some(report);
    }

    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.results.lock().expect("results lock poisoned").clone()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub reddit_auth: Arc<RedditAuth>,
    /// Base URL the scan clients talk to; swapped out in tests.
    pub api_base_url: Arc<str>,
    pub presets: Arc<Vec<ScanPreset>>,
    pub discovery: ScanState<DiscoveryReport>,
    pub signals: ScanState<SignalReport>,
    pub cache: Arc<DiscoveryCache>,
}

impl AppState {
    /// Builds the application state against the production Reddit hosts.
    ///
    /// # Errors
    ///
    /// Returns [`RedditError`] if the OAuth HTTP client cannot be built.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, RedditError> {
        Self::with_base_urls(
            config,
            "https://www.reddit.com",
            "https://oauth.reddit.com",
        )
    }

    /// Builds the application state with injectable Reddit hosts (for
    /// wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`RedditError`] if the OAuth HTTP client cannot be built.
    pub fn with_base_urls(
        config: Arc<AppConfig>,
        auth_base_url: &str,
        api_base_url: &str,
    ) -> Result<Self, RedditError> {
        let reddit_auth = RedditAuth::with_base_url(
            &config.reddit_client_id,
            &config.reddit_client_secret,
            &config.redirect_uri,
            &config.user_agent,
            config.request_timeout_secs,
            auth_base_url,
        )?;

        let presets = match load_presets(&config.presets_path) {
            Ok(presets) => presets,
            Err(e) => {
                tracing::info!(
                    path = %config.presets_path.display(),
                    reason = %e,
                    "presets file not loaded; using built-in presets"
                );
                builtin_presets()
            }
        };

        let cache = DiscoveryCache::new(Duration::from_secs(config.discovery_cache_ttl_secs));

        Ok(Self {
            config,
            sessions: SessionStore::new(),
            reddit_auth: Arc::new(reddit_auth),
            api_base_url: Arc::from(api_base_url),
            presets: Arc::new(presets),
            discovery: ScanState::default(),
            signals: ScanState::default(),
            cache: Arc::new(cache),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "scan_running" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Lifecycle snapshot returned by the scan status and start endpoints.
#[derive(Debug, Serialize)]
pub(super) struct ScanSnapshot {
    status: ScanStatus,
    progress: ProgressBody,
    cached: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ProgressBody {
    fraction: f32,
    label: String,
}

impl ScanSnapshot {
    pub(super) fn from_handle(handle: &ScanHandle) -> Self {
        let (fraction, label) = handle.progress().snapshot();
        Self {
            status: handle.status(),
            progress: ProgressBody { fraction, label },
            cached: false,
        }
    }

    pub(super) fn idle() -> Self {
        Self {
            status: ScanStatus::NotStarted,
            progress: ProgressBody {
                fraction: 0.0,
                label: String::new(),
            },
            cached: false,
        }
    }

    pub(super) fn cached_completed() -> Self {
        Self {
            status: ScanStatus::Completed,
            progress: ProgressBody {
                fraction: 1.0,
                label: "served from cache".to_string(),
            },
            cached: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(sessions: SessionStore) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/reddit/url", get(auth::reddit_authorize_url))
        .route("/api/v1/auth/session", get(auth::session_info))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/discovery/scans", post(discovery::start_scan))
        .route(
            "/api/v1/discovery/scans/current",
            get(discovery::current_scan),
        )
        .route(
            "/api/v1/discovery/scans/cancel",
            post(discovery::cancel_scan),
        )
        .route("/api/v1/discovery/results", get(discovery::results))
        .route("/api/v1/discovery/results.csv", get(discovery::results_csv))
        .route("/api/v1/signals/scans", post(signals::start_scan))
        .route("/api/v1/signals/scans/current", get(signals::current_scan))
        .route("/api/v1/signals/scans/cancel", post(signals::cancel_scan))
        .route("/api/v1/signals/results", get(signals::results))
        .route("/api/v1/signals/results.csv", get(signals::results_csv))
        .layer(axum::middleware::from_fn_with_state(
            sessions,
            require_session,
        ))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/reddit/callback", get(auth::reddit_callback));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(state.sessions.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

/// Resolves the session's Reddit credentials into a ready API client.
///
/// A failed refresh-token exchange is fatal to the session: the session is
/// dropped and the caller gets a 401.
pub(super) async fn authenticated_client(
    state: &AppState,
    request_id: &str,
    token: &str,
) -> Result<RedditClient, ApiError> {
    let Some(credentials) = state.sessions.get(token).and_then(|s| s.reddit) else {
        return Err(ApiError::new(
            request_id,
            "unauthorized",
            "Reddit account not connected",
        ));
    };

    match scan_client(state, &credentials.refresh_token).await {
        Ok(client) => Ok(client),
        Err(e) => {
            tracing::warn!(error = %e, "refresh-token exchange failed; clearing session");
            state.sessions.remove(token);
            Err(ApiError::new(
                request_id,
                "unauthorized",
                "authentication failed, please retry",
            ))
        }
    }
}

async fn scan_client(state: &AppState, refresh_token: &str) -> Result<RedditClient, RedditError> {
    let access_token = state.reddit_auth.exchange_refresh_token(refresh_token).await?;
    RedditClient::with_base_url(
        &access_token,
        &state.config.user_agent,
        state.config.request_timeout_secs,
        &state.api_base_url,
    )
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
