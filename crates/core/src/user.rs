// User domain types
//
// Public views of a registered principal. The stored password hash never
// appears in any of these types, so serializing them cannot leak it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A registered user as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Display name (2-50 characters).
    pub name: String,
    /// Normalized (trimmed, lower-cased) email address.
    pub email: String,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Timestamp when the account was registered.
    pub registered_at: DateTime<Utc>,
    /// Number of tracked downloads.
    pub total_downloads: i64,
    /// Timestamp of the most recent tracked download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_download: Option<DateTime<Utc>>,
}

/// Minimal identity returned by session verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Per-user download statistics shown on the profile page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_downloads: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_download: Option<DateTime<Utc>>,
    pub member_since: DateTime<Utc>,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub stats: UserStats,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        Self {
            total_downloads: user.total_downloads,
            last_download: user.last_download,
            member_since: user.registered_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let stats = UserStats::from(&user);
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            registered_at: user.registered_at,
            stats,
        }
    }
}
