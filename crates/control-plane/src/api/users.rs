// Users API routes
// Decision: Member listing is open to any authenticated user; there is no
// role model yet

use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use pupillix_core::{DownloadHistory, User, UserProfile};
use std::sync::Arc;

use super::common::{ErrorResponse, ListResponse};
use crate::auth::middleware::{AuthState, AuthUser};
use crate::error::ApiError;
use crate::services::{DownloadService, UserService};

/// App state for users routes
#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
    pub downloads: Arc<DownloadService>,
    pub auth: AuthState,
}

impl FromRef<UsersState> for AuthState {
    fn from_ref(input: &UsersState) -> Self {
        input.auth.clone()
    }
}

/// Create users routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/api/user/profile", get(get_profile))
        .route("/api/user/download-history", get(get_download_history))
        .route("/api/user/all", get(list_users))
        .with_state(state)
}

/// GET /api/user/profile - Profile and download stats of the current user
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Current user's profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_profile(
    State(state): State<UsersState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.service.profile(user.id).await?;
    Ok(Json(profile))
}

/// GET /api/user/download-history - Current user's downloads, newest first
#[utoipa::path(
    get,
    path = "/api/user/download-history",
    responses(
        (status = 200, description = "Download history", body = DownloadHistory),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_download_history(
    State(state): State<UsersState>,
    AuthUser(user): AuthUser,
) -> Result<Json<DownloadHistory>, ApiError> {
    let history = state.downloads.history(user.id).await?;
    Ok(Json(history))
}

/// GET /api/user/all - List all users
///
/// Newest registration first. Requires authentication only.
#[utoipa::path(
    get,
    path = "/api/user/all",
    responses(
        (status = 200, description = "List of users", body = ListResponse<User>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _auth: AuthUser,
) -> Result<Json<ListResponse<User>>, ApiError> {
    let users = state.service.list_all().await?;
    Ok(Json(users.into()))
}
