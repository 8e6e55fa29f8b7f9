use std::str::FromStr;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use redscout_core::resolve_preset;
use redscout_engine::{run_signal_scan, signals_csv, SignalReport, SignalScanParams, TimeWindow};

use crate::middleware::{RequestId, SessionToken};

use super::{
    authenticated_client, ApiError, ApiResponse, AppState, ResponseMeta, ScanSnapshot,
};

const DEFAULT_PRESET: &str = "standard";

#[derive(Debug, Deserialize)]
pub(super) struct SignalScanRequest {
    pub subreddits: Vec<String>,
    pub keywords: Vec<String>,
    pub window: Option<String>,
    /// Preset name; ignored when explicit limits are given.
    pub preset: Option<String>,
    pub post_limit: Option<u32>,
    pub comment_limit: Option<u32>,
}

fn resolve_limits(state: &AppState, body: &SignalScanRequest) -> Result<(u32, u32), String> {
    if let (Some(post_limit), Some(comment_limit)) = (body.post_limit, body.comment_limit) {
        return Ok((post_limit, comment_limit));
    }

    let name = body.preset.as_deref().unwrap_or(DEFAULT_PRESET);
    let preset = resolve_preset(&state.presets, name)
        .ok_or_else(|| format!("unknown preset '{name}'"))?;
    Ok((
        body.post_limit.unwrap_or(preset.post_limit),
        body.comment_limit.unwrap_or(preset.comment_limit),
    ))
}

pub(super) async fn start_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(token): Extension<SessionToken>,
    Json(body): Json<SignalScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (post_limit, comment_limit) = resolve_limits(&state, &body)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;
    let window = match body.window.as_deref() {
        Some(raw) => TimeWindow::from_str(raw)
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
        None => TimeWindow::Month,
    };

    let params = SignalScanParams {
        subreddits: body.subreddits,
        keywords: body.keywords,
        window,
        post_limit,
        comment_limit,
    }
    .validated()
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let client = authenticated_client(&state, &req_id.0, &token.0).await?;

    let handle = state.signals.slot.begin().map_err(|e| {
        ApiError::new(req_id.0.clone(), "scan_running", e.to_string())
    })?;

    let snapshot = ScanSnapshot::from_handle(&handle);
    let scan_state = state.signals.clone();
    tokio::spawn(async move {
        let report =
            run_signal_scan(&client, &params, handle.cancel_token(), handle.progress()).await;
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
        .signals
        .slot
        .current()
        .map_or_else(ScanSnapshot::idle, |h| ScanSnapshot::from_handle(&h));
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn cancel_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ScanSnapshot>> {
    let data = match state.signals.slot.current() {
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
) -> Result<Json<ApiResponse<SignalReport>>, ApiError> {
    let report = state
        .signals
        .latest()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no signal results yet"))?;
    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn results_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .signals
        .latest()
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no signal results yet"))?;
    let bytes = signals_csv(&report.signals).map_err(|e| {
        tracing::error!(error = %e, "CSV serialization failed");
        ApiError::new(req_id.0, "internal_error", "CSV serialization failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"opportunity_finder_signals.csv\"",
            ),
        ],
        bytes,
    ))
}
