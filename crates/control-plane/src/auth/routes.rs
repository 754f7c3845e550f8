// Authentication HTTP routes
// Decision: Use /api/auth/* prefix for all auth endpoints
// Decision: Tokens are returned in the JSON body only; the client keeps them

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use pupillix_core::UserIdentity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::middleware::{AuthState, AuthUser};
use crate::api::common::ErrorResponse;
use crate::api::validation::{validate_login, validate_registration};
use crate::error::ApiError;
use crate::services::{AccountService, Session};

/// Signup request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Display name, 2-50 characters after trimming
    #[serde(default)]
    #[schema(example = "Ann")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ann@example.com")]
    pub email: String,
    /// At least 6 characters
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session response returned by signup and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserIdentity,
    /// Bearer token for the Authorization header
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            user: UserIdentity::from(&session.user),
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
        }
    }
}

/// Session verification response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub user: UserIdentity,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", post(verify))
        .with_state(state)
}

fn account_service(state: &AuthState) -> AccountService {
    AccountService::new(
        state.db.clone(),
        state.hasher.clone(),
        state.jwt_service.clone(),
    )
}

/// POST /api/auth/signup - Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AuthState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload?;
    let registration = validate_registration(&req.name, &req.email, &req.password)?;

    let session = account_service(&state).register(registration).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/auth/login - Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;
    let credentials = validate_login(&req.email, &req.password)?;

    let session = account_service(&state).login(credentials).await?;
    Ok(Json(session.into()))
}

/// POST /api/auth/verify - Resolve the bearer token to its user
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Session is valid", body = VerifyResponse),
        (status = 401, description = "Missing, invalid or expired session", body = ErrorResponse),
        (status = 403, description = "Account is inactive", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn verify(AuthUser(user): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        user: UserIdentity::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pupillix_core::User;
    use uuid::Uuid;

    #[test]
    fn test_auth_response_shape() {
        let user = User {
            id: Uuid::nil(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            is_active: true,
            registered_at: Utc::now(),
            total_downloads: 0,
            last_download: None,
        };
        let response = AuthResponse::from(Session {
            user,
            token: "tok".to_string(),
            expires_in: 604800,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 604800);
        assert_eq!(json["user"]["email"], "ann@x.com");
        // Summary only
        assert!(json["user"].get("isActive").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        assert_eq!(req.name, "");
        assert_eq!(req.password, "");
    }
}
