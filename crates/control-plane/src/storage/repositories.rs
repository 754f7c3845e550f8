// PostgreSQL repositories
// Decision: Runtime-checked queries (query_as) so the crate builds without a
// live database
// Decision: Migrations are embedded and applied on connect

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::StorageResult;
use super::models::*;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str =
    "id, name, email, password_hash, is_active, registered_at, total_downloads, last_download";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn from_url(database_url: &str) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self::new(pool))
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StorageResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All users, newest registration first
    pub async fn list_users(&self) -> StorageResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY registered_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> StorageResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                is_active = COALESCE($3, is_active)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Downloads
    // ============================================

    /// Bump the counters and append the event in one transaction.
    /// The UPDATE takes the row lock, so concurrent tracks serialize.
    /// `last_download` only moves forward; GREATEST skips the initial NULL.
    /// Returns `None` if the user does not exist.
    pub async fn record_download(
        &self,
        user_id: Uuid,
        input: CreateDownloadEventRow,
    ) -> StorageResult<Option<DownloadCountersRow>> {
        let mut tx = self.pool.begin().await?;

        let counters = sqlx::query_as::<_, DownloadCountersRow>(
            r#"
            UPDATE users
            SET total_downloads = total_downloads + 1,
                last_download = GREATEST(last_download, $2)
            WHERE id = $1
            RETURNING total_downloads, last_download
            "#,
        )
        .bind(user_id)
        .bind(input.downloaded_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(counters) = counters else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO download_events (user_id, downloaded_at, version, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(input.downloaded_at)
        .bind(&input.version)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(counters))
    }

    /// A user's events, newest first (later insertion wins ties).
    /// Returns `None` if the user does not exist.
    pub async fn list_download_events(
        &self,
        user_id: Uuid,
    ) -> StorageResult<Option<(UserRow, Vec<DownloadEventRow>)>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            tx.rollback().await?;
            return Ok(None);
        };

        let events = sqlx::query_as::<_, DownloadEventRow>(
            r#"
            SELECT id, user_id, downloaded_at, version, ip_address, user_agent
            FROM download_events
            WHERE user_id = $1
            ORDER BY downloaded_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((user, events)))
    }

    /// Global aggregates read from one snapshot
    pub async fn download_stats(&self, recent_limit: usize) -> StorageResult<DownloadStatsRow> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total_users, total_downloads): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*)::BIGINT, COALESCE(SUM(total_downloads), 0)::BIGINT FROM users",
        )
        .fetch_one(&mut *tx)
        .await?;

        let recent = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE last_download IS NOT NULL
            ORDER BY last_download DESC
            LIMIT $1
            "#
        ))
        .bind(recent_limit as i64)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DownloadStatsRow {
            total_users,
            total_downloads,
            recent,
        })
    }
}
