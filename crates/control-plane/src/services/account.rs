// Account service: registration and login
// Decision: Argon2 runs on the blocking pool so it never stalls the runtime
// Decision: Unknown email and wrong password are indistinguishable, including
// in timing (a dummy verification runs for unknown emails)
// Decision: The inactive check runs only after the password matched

use std::sync::Arc;

use anyhow::Context;
use pupillix_core::User;

use crate::api::validation::{Credentials, Registration};
use crate::auth::jwt::JwtService;
use crate::error::{ApiError, ApiResult, AuthFailure};
use crate::storage::{CreateUserRow, PasswordHasher, StorageBackend};

/// A freshly authenticated user with their session token
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

pub struct AccountService {
    db: Arc<StorageBackend>,
    hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
}

impl AccountService {
    pub fn new(
        db: Arc<StorageBackend>,
        hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db,
            hasher,
            jwt_service,
        }
    }

    pub async fn register(&self, input: Registration) -> ApiResult<Session> {
        // Fast path; the store's unique check below is authoritative
        if self.db.get_user_by_email(&input.email).await?.is_some() {
            return Err(ApiError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let hasher = self.hasher.clone();
        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")??;

        let row = self
            .db
            .create_user(CreateUserRow {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %row.id, "User registered");
        self.open_session(row.into())
    }

    pub async fn login(&self, input: Credentials) -> ApiResult<Session> {
        let row = self.db.get_user_by_email(&input.email).await?;

        let hasher = self.hasher.clone();
        let password = input.password;
        let stored_hash = row.as_ref().map(|r| r.password_hash.clone());
        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => {
                hasher.verify_dummy(&password);
                Ok(false)
            }
        })
        .await
        .context("password verification task failed")??;

        let row = match row {
            Some(row) if matched => row,
            _ => {
                tracing::debug!("Login rejected: invalid credentials");
                return Err(ApiError::Unauthenticated(AuthFailure::InvalidCredentials));
            }
        };

        if !row.is_active {
            return Err(ApiError::AccountInactive);
        }

        tracing::info!(user_id = %row.id, "User logged in");
        self.open_session(row.into())
    }

    fn open_session(&self, user: User) -> ApiResult<Session> {
        let token = self.jwt_service.issue(user.id)?;
        Ok(Session {
            user,
            token,
            expires_in: self.jwt_service.token_lifetime_secs(),
        })
    }
}
