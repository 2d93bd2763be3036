// HTTP request handlers
use crate::application::filter::FilterRequest;
use crate::application::parser::{deserialize_optional_timestamp, deserialize_timestamp};
use crate::application::view_state::SettingsUpdate;
use crate::domain::error::ViewerError;
use crate::infrastructure::event_stream::{stream_from_receiver, wants_compressed_frames};
use crate::infrastructure::http_response::{accepts_brotli, error_response, json_response};
use crate::infrastructure::static_assets::serve_asset;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bounds may be naive date-time input values, read as local time.
#[derive(Deserialize)]
pub struct RangeBody {
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct QuickBody {
    pub days: i64,
}

#[derive(Deserialize)]
pub struct ZoomBody {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end: DateTime<Utc>,
}

pub fn status_for(error: &ViewerError) -> StatusCode {
    match error {
        e if e.is_validation() => StatusCode::BAD_REQUEST,
        ViewerError::NoData => StatusCode::NOT_FOUND,
        ViewerError::Busy => StatusCode::CONFLICT,
        ViewerError::NoValidData | ViewerError::EmptyFilterResult => StatusCode::UNPROCESSABLE_ENTITY,
        ViewerError::Read(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn error_for(error: ViewerError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }
    error_response(status, &error.to_string()).await
}

async fn json_ok<T: Serialize>(data: &T, compress: bool) -> Response {
    match json_response(StatusCode::OK, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn status(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let status = state.viewer_service.status().await;
    json_ok(&status, accepts_brotli(&headers)).await
}

/// Load an uploaded JSONL body and stream pipeline progress
pub async fn upload(headers: HeaderMap, State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.viewer_service.load_text(body) {
        Ok(rx) => stream_from_receiver(rx, wants_compressed_frames(&headers)).into_response(),
        Err(e) => error_for(e).await,
    }
}

pub async fn load_sample(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.viewer_service.load_sample().await {
        Ok(rx) => stream_from_receiver(rx, wants_compressed_frames(&headers)).into_response(),
        Err(e) => error_for(e).await,
    }
}

pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.viewer_service.dashboard().await {
        Ok(dashboard) => json_ok(&dashboard, accepts_brotli(&headers)).await,
        Err(e) => error_for(e).await,
    }
}

async fn filtered(state: &AppState, headers: &HeaderMap, request: FilterRequest) -> Response {
    match state.viewer_service.apply_filter(request).await {
        Ok(dashboard) => json_ok(&dashboard, accepts_brotli(headers)).await,
        Err(e) => error_for(e).await,
    }
}

pub async fn filter_range(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RangeBody>,
) -> Response {
    let request = FilterRequest::Range {
        start: body.start,
        end: body.end,
    };
    filtered(&state, &headers, request).await
}

pub async fn filter_quick(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuickBody>,
) -> Response {
    filtered(&state, &headers, FilterRequest::Quick { days: body.days }).await
}

pub async fn filter_reset(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    filtered(&state, &headers, FilterRequest::Reset).await
}

pub async fn filter_zoom(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ZoomBody>,
) -> Response {
    let request = FilterRequest::ChartZoom {
        start: body.start,
        end: body.end,
    };
    filtered(&state, &headers, request).await
}

pub async fn update_settings(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.viewer_service.update_settings(update).await {
        Ok(Some(dashboard)) => json_ok(&dashboard, accepts_brotli(&headers)).await,
        // Nothing loaded yet; kept for the next load
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_for(e).await,
    }
}

/// Everything outside the API is a static file
pub async fn static_asset(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    serve_asset(&state.static_root, uri.path()).await
}
