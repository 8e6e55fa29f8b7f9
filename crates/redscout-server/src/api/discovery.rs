use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use redscout_engine::{
    communities_csv, run_discovery, DiscoveryParams, DiscoveryReport, ScanStatus,
};

use crate::middleware::{RequestId, SessionToken};

use super::{
    authenticated_client, ApiError, ApiResponse, AppState, ResponseMeta, ScanSnapshot,
};

const DEFAULT_DIRECT_LIMIT: u32 = 10;
const DEFAULT_POST_LIMIT: u32 = 25;
const DEFAULT_COMMENT_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub(super) struct DiscoveryScanRequest {
    pub queries: Vec<String>,
    pub direct_limit: Option<u32>,
    pub post_limit: Option<u32>,
    pub comment_limit: Option<u32>,
}

/// Starts a discovery scan, serving a fresh cached result without touching
/// the API at all when one exists for identical parameters.
pub(super) async fn start_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(token): Extension<SessionToken>,
    Json(body): Json<DiscoveryScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let params = DiscoveryParams {
        queries: body.queries,
        direct_limit: body.direct_limit.unwrap_or(DEFAULT_DIRECT_LIMIT),
        post_limit: body.post_limit.unwrap_or(DEFAULT_POST_LIMIT),
        comment_limit: body.comment_limit.unwrap_or(DEFAULT_COMMENT_LIMIT),
    }
    .validated()
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    if let Some(communities) = state.cache.get(&params) {
        state.discovery.store(DiscoveryReport {
            communities,
            status: ScanStatus::Completed,
        });
        return Ok((
            StatusCode::OK,
            Json(ApiResponse {
                data: ScanSnapshot::cached_completed(),
                meta: ResponseMeta::new(req_id.0),
            }),
        ));
    }

    let client = authenticated_client(&state, &req_id.0, &token.0).await?;

    let handle = state.discovery.slot.begin().map_err(|e| {
        ApiError::new(req_id.0.clone(), "scan_running", e.to_string())
    })?;

    let snapshot = ScanSnapshot::from_handle(&handle);
    let scan_state = state.discovery.clone();
    let cache = state.cache.clone();
    tokio::spawn(async move {
        let report =
            run_discovery(&client, &params, handle.cancel_token(), handle.progress()).await;
        if report.status == ScanStatus::Completed {
            cache.insert(params, report.communities.clone());
        }
        scan_state.slot.finish(&handle, report.status);
        scan_state.store(report);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: snapshot,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn current_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ScanSnapshot>> {
    let data = state
        .discovery
        .slot
        .current()
        .map_or_else(ScanSnapshot::idle, |h| ScanSnapshot::from_handle(&h));
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Advisory cancel: flags the running scan and returns immediately; the
/// task stops at its next checkpoint and keeps partial results.
pub(super) async fn cancel_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ScanSnapshot>> {
    let data = match state.discovery.slot.current() {
        Some(handle) => {
            handle.request_cancel();
            ScanSnapshot::from_handle(&handle)
        }
        None => ScanSnapshot::idle(),
    };
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DiscoveryReport>>, ApiError> {
    let report = state.discovery.latest().ok_or_else(|| {
        ApiError::new(req_id.0.clone(), "not_found", "no discovery results yet")
    })?;
    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn results_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.discovery.latest().ok_or_else(|| {
        ApiError::new(req_id.0.clone(), "not_found", "no discovery results yet")
    })?;
    let bytes = communities_csv(&report.communities).map_err(|e| {
        tracing::error!(error = %e, "CSV serialization failed");
        ApiError::new(req_id.0, "internal_error", "CSV serialization failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"community_discovery_results.csv\"",
            ),
        ],
        bytes,
    ))
}
