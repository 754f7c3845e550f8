// Input validation for auth and download APIs
//
// Every check runs before the request reaches a service. Registration
// reports all failing fields at once; login only checks shape so that it
// cannot be used to probe password rules.

use std::sync::LazyLock;

use pupillix_core::DEFAULT_DOWNLOAD_VERSION;
use regex::Regex;

use super::common::FieldError;
use crate::error::ApiError;
use crate::storage::MAX_PASSWORD_BYTES;

// =============================================================================
// Limits
// =============================================================================

/// Display name length in characters, after trimming.
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;

/// Minimum password length in characters (registration only).
pub const PASSWORD_MIN_CHARS: usize = 6;

/// RFC 5321 path limit.
pub const MAX_EMAIL_BYTES: usize = 254;

/// Maximum size of a tracked version string.
pub const MAX_VERSION_BYTES: usize = 64;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

// =============================================================================
// Validated inputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Trimmed display name
    pub name: String,
    /// Normalized email
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Normalized email
    pub email: String,
    pub password: String,
}

// =============================================================================
// Validation Functions
// =============================================================================

/// Trim and lower-case an email, returning `None` if it is not well formed.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if email.len() > MAX_EMAIL_BYTES || !EMAIL_RE.is_match(&email) {
        return None;
    }
    Some(email)
}

fn check_name(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let name = raw.trim();
    let chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        errors.push(FieldError::new(
            "name",
            format!("Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        ));
    }
    name.to_string()
}

fn check_email(raw: &str, errors: &mut Vec<FieldError>) -> String {
    match normalize_email(raw) {
        Some(email) => email,
        None => {
            errors.push(FieldError::new("email", "Please provide a valid email"));
            String::new()
        }
    }
}

fn into_result<T>(value: T, errors: Vec<FieldError>) -> Result<T, ApiError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate a signup request
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<Registration, ApiError> {
    let mut errors = Vec::new();

    let name = check_name(name, &mut errors);
    let email = check_email(email, &mut errors);

    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
        ));
    } else if password.len() > MAX_PASSWORD_BYTES {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at most {MAX_PASSWORD_BYTES} bytes"),
        ));
    }

    into_result(
        Registration {
            name,
            email,
            password: password.to_string(),
        },
        errors,
    )
}

/// Validate a login request
pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ApiError> {
    let mut errors = Vec::new();

    let email = check_email(email, &mut errors);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    into_result(
        Credentials {
            email,
            password: password.to_string(),
        },
        errors,
    )
}

/// Resolve the tracked version, defaulting when absent
pub fn validate_version(version: Option<&str>) -> Result<String, ApiError> {
    let version = match version.map(str::trim) {
        None => return Ok(DEFAULT_DOWNLOAD_VERSION.to_string()),
        Some(v) => v,
    };

    if version.is_empty() || version.len() > MAX_VERSION_BYTES {
        tracing::warn!(
            "Download version rejected: {} bytes (max: {})",
            version.len(),
            MAX_VERSION_BYTES
        );
        return Err(ApiError::validation(
            "version",
            &format!("Version must be between 1 and {MAX_VERSION_BYTES} bytes"),
        ));
    }
    Ok(version.to_string())
}
