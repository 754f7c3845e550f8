// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
// Decision: Download events are embedded in the owning user document so one
// write lock covers counter + append
//
// This implementation provides a PostgreSQL-compatible API backed by in-memory
// HashMaps, allowing the control-plane to run without a database for development.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::models::*;

#[derive(Debug, Clone)]
struct UserDocument {
    row: UserRow,
    /// Insertion order, oldest first
    downloads: Vec<DownloadEventRow>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, UserDocument>,
    next_event_id: i64,
}

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    inner: RwLock<Collections>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StorageResult<UserRow> {
        let mut inner = self.inner.write();

        // Uniqueness is checked under the same write lock as the insert
        if inner.users.values().any(|doc| doc.row.email == input.email) {
            return Err(StorageError::DuplicateEmail);
        }

        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            is_active: true,
            registered_at: Self::now(),
            total_downloads: 0,
            last_download: None,
        };
        inner.users.insert(
            id,
            UserDocument {
                row: row.clone(),
                downloads: Vec::new(),
            },
        );
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        Ok(self.inner.read().users.get(&id).map(|doc| doc.row.clone()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|doc| doc.row.email == email)
            .map(|doc| doc.row.clone()))
    }

    /// All users, newest registration first
    pub async fn list_users(&self) -> StorageResult<Vec<UserRow>> {
        let mut result: Vec<_> = self
            .inner
            .read()
            .users
            .values()
            .map(|doc| doc.row.clone())
            .collect();
        result.sort_by(|a, b| b.registered_at.cmp(&a.registered_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<Option<UserRow>> {
        let mut inner = self.inner.write();
        if let Some(doc) = inner.users.get_mut(&id) {
            if let Some(name) = input.name {
                doc.row.name = name;
            }
            if let Some(is_active) = input.is_active {
                doc.row.is_active = is_active;
            }
            return Ok(Some(doc.row.clone()));
        }
        Ok(None)
    }

    // ============================================
    // Downloads
    // ============================================

    /// Append an event and bump the counters atomically.
    /// Returns `None` if the user does not exist.
    pub async fn record_download(
        &self,
        user_id: Uuid,
        input: CreateDownloadEventRow,
    ) -> StorageResult<Option<DownloadCountersRow>> {
        let mut inner = self.inner.write();
        inner.next_event_id += 1;
        let event_id = inner.next_event_id;

        let Some(doc) = inner.users.get_mut(&user_id) else {
            return Ok(None);
        };

        doc.downloads.push(DownloadEventRow {
            id: event_id,
            user_id,
            downloaded_at: input.downloaded_at,
            version: input.version,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
        });
        // Stamps are taken before the lock, so a later commit may carry an older one
        let last_download = doc
            .row
            .last_download
            .map_or(input.downloaded_at, |prev| prev.max(input.downloaded_at));
        doc.row.total_downloads += 1;
        doc.row.last_download = Some(last_download);

        Ok(Some(DownloadCountersRow {
            total_downloads: doc.row.total_downloads,
            last_download,
        }))
    }

    /// A user's events, newest first (later insertion wins ties).
    /// Returns `None` if the user does not exist.
    pub async fn list_download_events(
        &self,
        user_id: Uuid,
    ) -> StorageResult<Option<(UserRow, Vec<DownloadEventRow>)>> {
        let inner = self.inner.read();
        let Some(doc) = inner.users.get(&user_id) else {
            return Ok(None);
        };

        let mut events = doc.downloads.clone();
        events.sort_by(|a, b| {
            b.downloaded_at
                .cmp(&a.downloaded_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(Some((doc.row.clone(), events)))
    }

    /// Global aggregates computed under a single read lock
    pub async fn download_stats(&self, recent_limit: usize) -> StorageResult<DownloadStatsRow> {
        let inner = self.inner.read();

        let total_users = inner.users.len() as i64;
        let total_downloads = inner
            .users
            .values()
            .map(|doc| doc.row.total_downloads)
            .sum();

        let mut recent: Vec<UserRow> = inner
            .users
            .values()
            .filter(|doc| doc.row.last_download.is_some())
            .map(|doc| doc.row.clone())
            .collect();
        recent.sort_by(|a, b| b.last_download.cmp(&a.last_download));
        recent.truncate(recent_limit);

        Ok(DownloadStatsRow {
            total_users,
            total_downloads,
            recent,
        })
    }
}
