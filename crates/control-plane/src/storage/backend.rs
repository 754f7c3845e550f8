// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use std::sync::Arc;

use uuid::Uuid;

use super::error::StorageResult;
use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> StorageResult<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Short name for health output and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StorageResult<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn list_users(&self) -> StorageResult<Vec<UserRow>> {
        match self {
            Self::Postgres(db) => db.list_users().await,
            Self::InMemory(db) => db.list_users().await,
        }
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    // ============================================
    // Downloads
    // ============================================

    pub async fn record_download(
        &self,
        user_id: Uuid,
        input: CreateDownloadEventRow,
    ) -> StorageResult<Option<DownloadCountersRow>> {
        match self {
            Self::Postgres(db) => db.record_download(user_id, input).await,
            Self::InMemory(db) => db.record_download(user_id, input).await,
        }
    }

    pub async fn list_download_events(
        &self,
        user_id: Uuid,
    ) -> StorageResult<Option<(UserRow, Vec<DownloadEventRow>)>> {
        match self {
            Self::Postgres(db) => db.list_download_events(user_id).await,
            Self::InMemory(db) => db.list_download_events(user_id).await,
        }
    }

    pub async fn download_stats(&self, recent_limit: usize) -> StorageResult<DownloadStatsRow> {
        match self {
            Self::Postgres(db) => db.download_stats(recent_limit).await,
            Self::InMemory(db) => db.download_stats(recent_limit).await,
        }
    }
}
