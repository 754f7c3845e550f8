// Download ledger service
// Decision: Counter bump and event append are one storage call; the service
// never reads-then-writes the counter itself
// Decision: Store failures are not retried, a retried append could double count

use std::sync::Arc;

use chrono::Utc;
use pupillix_core::{DownloadHistory, DownloadReceipt, DownloadStats, RECENT_DOWNLOADS_LIMIT};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::storage::{CreateDownloadEventRow, StorageBackend};

/// A download to record, with request metadata already resolved
#[derive(Debug, Clone)]
pub struct TrackDownload {
    pub version: String,
    pub ip_address: String,
    pub user_agent: String,
}

pub struct DownloadService {
    db: Arc<StorageBackend>,
    download_url: String,
}

impl DownloadService {
    pub fn new(db: Arc<StorageBackend>, download_url: String) -> Self {
        Self { db, download_url }
    }

    pub async fn track(&self, user_id: Uuid, input: TrackDownload) -> ApiResult<DownloadReceipt> {
        let event = CreateDownloadEventRow {
            downloaded_at: Utc::now(),
            version: input.version,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
        };
        let version = event.version.clone();

        let counters = self
            .db
            .record_download(user_id, event)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        tracing::info!(
            user_id = %user_id,
            version = %version,
            total_downloads = counters.total_downloads,
            "Download tracked"
        );

        Ok(DownloadReceipt {
            total_downloads: counters.total_downloads,
            last_download: counters.last_download,
            download_url: self.download_url.clone(),
        })
    }

    /// Events newest first
    pub async fn history(&self, user_id: Uuid) -> ApiResult<DownloadHistory> {
        let (user, events) = self
            .db
            .list_download_events(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(DownloadHistory {
            total_downloads: user.total_downloads,
            downloads: events.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn stats(&self) -> ApiResult<DownloadStats> {
        let stats = self.db.download_stats(RECENT_DOWNLOADS_LIMIT).await?;

        Ok(DownloadStats {
            total_users: stats.total_users,
            total_downloads: stats.total_downloads,
            recent_downloads: stats
                .recent
                .iter()
                .filter_map(|row| row.to_recent_download())
                .collect(),
        })
    }
}
