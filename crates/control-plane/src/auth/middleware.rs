// Authentication extractor
// Decision: Bearer tokens in the Authorization header are the only credential;
// any other scheme is treated as no credential at all. The scheme name is
// case-insensitive (RFC 7235)
// Decision: The user is re-read from the store on every request so a
// deactivated account is locked out even while its token is still valid

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use pupillix_core::User;
use std::sync::Arc;

use super::{config::AuthConfig, jwt::JwtService};
use crate::error::{ApiError, AuthFailure};
use crate::storage::{PasswordHasher, StorageBackend};

/// Authenticated user resolved from the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub jwt_service: Arc<JwtService>,
    pub hasher: Arc<PasswordHasher>,
    pub db: Arc<StorageBackend>,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: Arc<StorageBackend>) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let hasher = Arc::new(PasswordHasher::new(config.argon2));
        Self {
            config,
            jwt_service,
            hasher,
            db,
        }
    }
}

/// Extractor for authenticated user
/// Rejects with 401 when unauthenticated and 403 when the account is inactive
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        authenticate(&parts.headers, &auth_state).await.map(AuthUser)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("Bearer")
        .then(|| token.trim())
}

/// Resolve request headers to an active user
pub async fn authenticate(headers: &HeaderMap, auth_state: &AuthState) -> Result<User, ApiError> {
    let token = bearer_token(headers)
        .ok_or(ApiError::Unauthenticated(AuthFailure::MissingCredentials))?;

    let user_id = auth_state
        .jwt_service
        .verify(token)
        .map_err(|_| ApiError::Unauthenticated(AuthFailure::InvalidSession))?;

    let user = auth_state.db.get_user(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Token subject no longer exists");
        ApiError::Unauthenticated(AuthFailure::InvalidSession)
    })?;

    if !user.is_active {
        return Err(ApiError::AccountInactive);
    }

    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Argon2Params, CreateUserRow, UpdateUser};
    use axum::http::HeaderValue;

    fn test_state() -> AuthState {
        let config = AuthConfig {
            argon2: Argon2Params::insecure_fast(),
            ..Default::default()
        };
        AuthState::new(config, Arc::new(StorageBackend::in_memory()))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn create_user(state: &AuthState) -> User {
        state
            .db
            .create_user(CreateUserRow {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap()
            .into()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("BEARER  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearerabc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let state = test_state();
        let err = authenticate(&HeaderMap::new(), &state).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unauthenticated(AuthFailure::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let state = test_state();
        let err = authenticate(&headers_with("Bearer garbage"), &state)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unauthenticated(AuthFailure::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_unknown_user() {
        let state = test_state();
        let token = state.jwt_service.issue(uuid::Uuid::now_v7()).unwrap();
        let err = authenticate(&headers_with(&format!("Bearer {token}")), &state)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unauthenticated(AuthFailure::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let state = test_state();
        let user = create_user(&state).await;
        let token = state.jwt_service.issue(user.id).unwrap();

        let resolved = authenticate(&headers_with(&format!("Bearer {token}")), &state)
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_inactive_user_rejected_while_token_verifies() {
        let state = test_state();
        let user = create_user(&state).await;
        let token = state.jwt_service.issue(user.id).unwrap();

        state
            .db
            .update_user(
                user.id,
                UpdateUser {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = authenticate(&headers_with(&format!("Bearer {token}")), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AccountInactive));
        // The raw token is still valid
        assert_eq!(state.jwt_service.verify(&token), Ok(user.id));
    }
}
