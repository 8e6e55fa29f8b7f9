use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use redscout_reddit::RedditClient;

use crate::middleware::{RequestId, SessionToken};
use crate::session::RedditCredentials;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginData {
    token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AuthorizeUrlData {
    url: String,
    state: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionData {
    reddit_connected: bool,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OkData {
    ok: bool,
}

/// Password gate. A correct password issues a fresh session token; anything
/// else is a plain 401 with no session side effects.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let supplied = body.password.as_bytes();
    let expected = state.config.app_password.as_bytes();
    if supplied.ct_eq(expected).unwrap_u8() != 1 {
        return Err(ApiError::new(req_id.0, "unauthorized", "invalid password"));
    }

    let token = state.sessions.create();
    Ok(Json(ApiResponse {
        data: LoginData { token },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Issues the Reddit authorization URL, binding a fresh OAuth `state` value
/// to the calling session.
pub(super) async fn reddit_authorize_url(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ApiResponse<AuthorizeUrlData>>, ApiError> {
    let oauth_state = Uuid::new_v4().to_string();
    if !state.sessions.set_oauth_state(&token.0, &oauth_state) {
        return Err(ApiError::new(req_id.0, "unauthorized", "session expired"));
    }

    Ok(Json(ApiResponse {
        data: AuthorizeUrlData {
            url: state.reddit_auth.authorize_url(&oauth_state),
            state: oauth_state,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// OAuth callback. Exchanges the code, resolves the account name, and
/// attaches the credentials to the session that initiated the grant. Any
/// failure along the way drops that session entirely.
pub(super) async fn reddit_callback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    let Some(token) = state.sessions.take_token_for_state(&query.state) else {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "unknown OAuth state; please log in again",
        ));
    };

    match link_reddit_account(&state, &token, &query.code).await {
        Ok(username) => Ok(Json(ApiResponse {
            data: SessionData {
                reddit_connected: true,
                username: Some(username),
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Reddit account link failed; clearing session");
            state.sessions.remove(&token);
            Err(ApiError::new(
                req_id.0,
                "unauthorized",
                "authentication failed, please retry",
            ))
        }
    }
}

async fn link_reddit_account(
    state: &AppState,
    token: &str,
    code: &str,
) -> Result<String, redscout_reddit::RedditError> {
    let refresh_token = state.reddit_auth.exchange_code(code).await?;
    let access_token = state
        .reddit_auth
        .exchange_refresh_token(&refresh_token)
        .await?;
    let client = RedditClient::with_base_url(
        &access_token,
        &state.config.user_agent,
        state.config.request_timeout_secs,
        &state.api_base_url,
    )?;
    let username = client.me().await?;

    state.sessions.attach_reddit(
        token,
        RedditCredentials {
            refresh_token,
            username: username.clone(),
        },
    );
    Ok(username)
}

pub(super) async fn session_info(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    let Some(session) = state.sessions.get(&token.0) else {
        return Err(ApiError::new(req_id.0, "unauthorized", "session expired"));
    };

    Ok(Json(ApiResponse {
        data: SessionData {
            reddit_connected: session.reddit.is_some(),
            username: session.reddit.map(|r| r.username),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(token): Extension<SessionToken>,
) -> Json<ApiResponse<OkData>> {
    state.sessions.remove(&token.0);
    Json(ApiResponse {
        data: OkData { ok: true },
        meta: ResponseMeta::new(req_id.0),
    })
}
