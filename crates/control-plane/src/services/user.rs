// User service: profile and member listing

use std::sync::Arc;

use pupillix_core::{User, UserProfile};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::storage::StorageBackend;

pub struct UserService {
    db: Arc<StorageBackend>,
}

impl UserService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    pub async fn profile(&self, user_id: Uuid) -> ApiResult<UserProfile> {
        let row = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        Ok(User::from(row).into())
    }

    /// Every user, newest registration first. Password hashes never leave
    /// the storage layer.
    pub async fn list_all(&self) -> ApiResult<Vec<User>> {
        let rows = self.db.list_users().await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
