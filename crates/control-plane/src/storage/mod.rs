// Storage layer for the Pupillix control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - Database: PostgreSQL repositories (sqlx, embedded migrations)
// - InMemoryDatabase: HashMap-backed store with the same API
// - StorageBackend: enum dispatch over the two
// - PasswordHasher: Argon2id hashing of stored credentials

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryDatabase;
pub use models::*;
pub use password::{Argon2Params, PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
pub use repositories::Database;
