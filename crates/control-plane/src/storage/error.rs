// Storage errors
// Decision: Only the failures callers branch on get their own variant;
// everything else is an opaque infrastructure failure.

use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Another user already holds this (normalized) email
    #[error("email already registered")]
    DuplicateEmail,

    /// Database driver error (connection, timeout, constraint, ...)
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Anything else (migrations, serialization, ...)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                && db_err.constraint().is_some_and(|c| c.contains("email"))
            {
                return StorageError::DuplicateEmail;
            }
        }
        StorageError::Database(err)
    }
}
