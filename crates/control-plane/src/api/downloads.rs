// Downloads API routes
// Decision: The track body is optional; an empty body records the default
// version, a malformed one is rejected
// Decision: Origin address trusts the first X-Forwarded-For entry, the
// service is expected to sit behind a proxy

use axum::{
    body::Bytes,
    extract::{ConnectInfo, FromRef, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use pupillix_core::{DownloadReceipt, DownloadStats};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use utoipa::ToSchema;

use super::common::ErrorResponse;
use super::validation::validate_version;
use crate::auth::middleware::{AuthState, AuthUser};
use crate::error::ApiError;
use crate::services::{DownloadService, TrackDownload};

const UNKNOWN: &str = "unknown";

/// App state for downloads routes
#[derive(Clone)]
pub struct DownloadsState {
    pub service: Arc<DownloadService>,
    pub auth: AuthState,
}

impl FromRef<DownloadsState> for AuthState {
    fn from_ref(input: &DownloadsState) -> Self {
        input.auth.clone()
    }
}

/// Request to track a download
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TrackDownloadRequest {
    /// Product version, defaults to "1.0.0"
    #[schema(example = "1.0.0")]
    pub version: Option<String>,
}

/// Create downloads routes
pub fn routes(state: DownloadsState) -> Router {
    Router::new()
        .route("/api/download/track", post(track_download))
        .route("/api/download/stats", get(get_stats))
        .with_state(state)
}

/// Origin address: first X-Forwarded-For entry, else the socket peer
pub fn origin_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(addr), _) => addr.to_string(),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => UNKNOWN.to_string(),
    }
}

/// Client identifier from the User-Agent header
pub fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn parse_track_body(body: &[u8]) -> Result<TrackDownloadRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TrackDownloadRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation("body", &format!("Invalid JSON body: {e}")))
}

/// POST /api/download/track - Record a download for the current user
#[utoipa::path(
    post,
    path = "/api/download/track",
    request_body(content = TrackDownloadRequest, description = "Optional, an empty body records the default version"),
    responses(
        (status = 200, description = "Download tracked", body = DownloadReceipt),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "downloads"
)]
pub async fn track_download(
    State(state): State<DownloadsState>,
    AuthUser(user): AuthUser,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DownloadReceipt>, ApiError> {
    let req = parse_track_body(&body)?;
    let version = validate_version(req.version.as_deref())?;

    let input = TrackDownload {
        version,
        ip_address: origin_address(&headers, connect_info.map(|ConnectInfo(addr)| addr)),
        user_agent: client_identifier(&headers),
    };

    let receipt = state.service.track(user.id, input).await?;
    Ok(Json(receipt))
}

/// GET /api/download/stats - Global download statistics
///
/// Open to any authenticated user.
#[utoipa::path(
    get,
    path = "/api/download/stats",
    responses(
        (status = 200, description = "Download statistics", body = DownloadStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "downloads"
)]
pub async fn get_stats(
    State(state): State<DownloadsState>,
    _auth: AuthUser,
) -> Result<Json<DownloadStats>, ApiError> {
    let stats = state.service.stats().await?;
    Ok(Json(stats))
}
