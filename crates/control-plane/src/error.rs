// API error taxonomy
// Decision: One error enum for every handler; status, code and message are
// derived from the variant so routes never build error bodies by hand
// Decision: Infrastructure failures always answer with a generic message;
// the full chain only goes to the log

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::common::{ErrorResponse, FieldError};
use crate::storage::{PasswordError, StorageError};

/// Why a request is not authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer token on the request
    MissingCredentials,
    /// Token failed verification or names an unknown user
    InvalidSession,
    /// Login with an unknown email or a wrong password
    InvalidCredentials,
}

impl AuthFailure {
    fn message(self) -> &'static str {
        match self {
            AuthFailure::MissingCredentials => "Authentication required",
            AuthFailure::InvalidSession => "Invalid or expired session",
            AuthFailure::InvalidCredentials => "Invalid credentials",
        }
    }

    fn code(self) -> &'static str {
        match self {
            AuthFailure::MissingCredentials => "authentication_required",
            AuthFailure::InvalidSession => "invalid_session",
            AuthFailure::InvalidCredentials => "invalid_credentials",
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Email already registered
    #[error("{0}")]
    Conflict(String),

    #[error("{}", .0.message())]
    Unauthenticated(AuthFailure),

    /// Credentials or token are fine but the account is disabled
    #[error("Account is inactive")]
    AccountInactive,

    #[error("{0}")]
    NotFound(String),

    /// Store, hashing or encoding failure with full context chain
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::AccountInactive => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Conflict(_) => "email_conflict",
            ApiError::Unauthenticated(failure) => failure.code(),
            ApiError::AccountInactive => "account_inactive",
            ApiError::NotFound(_) => "not_found",
            ApiError::Infrastructure(_) => "internal_error",
        }
    }

    /// Message safe to show to the client
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Infrastructure(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail => {
                ApiError::Conflict("User already exists with this email".to_string())
            }
            StorageError::Database(e) => {
                ApiError::Infrastructure(anyhow::Error::new(e).context("database operation failed"))
            }
            StorageError::Other(e) => ApiError::Infrastructure(e),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty | PasswordError::TooLong => {
                ApiError::validation("password", &err.to_string())
            }
            PasswordError::Hash(_) => ApiError::Infrastructure(anyhow::Error::new(err)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("body", &rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Infrastructure(e) => {
                tracing::error!("Internal service error: {:#}", e);
            }
            ApiError::Unauthenticated(_) | ApiError::AccountInactive => {
                tracing::info!("Authentication error: {}", self);
            }
            ApiError::Conflict(_) => {
                tracing::warn!("Conflict error: {}", self);
            }
            ApiError::Validation(_) | ApiError::NotFound(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
            code: self.code().to_string(),
            details: match self {
                ApiError::Validation(details) => details,
                _ => Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
