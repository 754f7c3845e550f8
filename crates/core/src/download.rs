// Download domain types
//
// A download event is an immutable record owned by exactly one user.
// Aggregates (receipt, history, stats) are read models derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Version recorded when the client does not send one.
pub const DEFAULT_DOWNLOAD_VERSION: &str = "1.0.0";

/// Number of users listed in `DownloadStats::recent_downloads`.
pub const RECENT_DOWNLOADS_LIMIT: usize = 10;

/// One tracked download.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DownloadEvent {
    /// When the download was tracked.
    pub downloaded_at: DateTime<Utc>,
    /// Product version that was downloaded.
    #[cfg_attr(feature = "openapi", schema(example = "1.0.0"))]
    pub version: String,
    /// Origin address of the request.
    pub ip_address: String,
    /// Client identifier (User-Agent header).
    pub user_agent: String,
}

/// Result of tracking a download.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DownloadReceipt {
    /// Counter after this download was recorded.
    pub total_downloads: i64,
    /// Timestamp of this download.
    pub last_download: DateTime<Utc>,
    /// Where the client should fetch the product from.
    pub download_url: String,
}

/// A user's download history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DownloadHistory {
    pub total_downloads: i64,
    pub downloads: Vec<DownloadEvent>,
}

/// Entry in the global "recent downloads" list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecentDownload {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub last_download: DateTime<Utc>,
    pub total_downloads: i64,
}

/// Global download statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DownloadStats {
    /// Number of registered users.
    pub total_users: i64,
    /// Sum of all users' download counters.
    pub total_downloads: i64,
    /// Users ordered by most recent download, at most `RECENT_DOWNLOADS_LIMIT`.
    pub recent_downloads: Vec<RecentDownload>,
}
