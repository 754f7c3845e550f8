// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use pupillix_core::{DownloadEvent, RecentDownload, User};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub registered_at: DateTime<Utc>,
    pub total_downloads: i64,
    pub last_download: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    /// Must already be normalized
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column unchanged.
/// The password hash is deliberately absent: it is write-once.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            is_active: row.is_active,
            registered_at: row.registered_at,
            total_downloads: row.total_downloads,
            last_download: row.last_download,
        }
    }
}

// ============================================
// Download events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct DownloadEventRow {
    pub id: i64,
    pub user_id: Uuid,
    pub downloaded_at: DateTime<Utc>,
    pub version: String,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct CreateDownloadEventRow {
    pub downloaded_at: DateTime<Utc>,
    pub version: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Counters returned after a download was recorded
#[derive(Debug, Clone, FromRow)]
pub struct DownloadCountersRow {
    pub total_downloads: i64,
    pub last_download: DateTime<Utc>,
}

/// Aggregate read over all users, taken from one snapshot
#[derive(Debug, Clone)]
pub struct DownloadStatsRow {
    pub total_users: i64,
    pub total_downloads: i64,
    /// Users with at least one download, most recent first
    pub recent: Vec<UserRow>,
}

impl From<DownloadEventRow> for DownloadEvent {
    fn from(row: DownloadEventRow) -> Self {
        Self {
            downloaded_at: row.downloaded_at,
            version: row.version,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
        }
    }
}

impl UserRow {
    /// `None` when the user has never downloaded.
    pub fn to_recent_download(&self) -> Option<RecentDownload> {
        self.last_download.map(|last_download| RecentDownload {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            last_download,
            total_downloads: self.total_downloads,
        })
    }
}
