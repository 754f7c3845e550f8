// Pupillix core
//
// DB-agnostic domain types shared by the control plane and its tools.
//
// Key design decisions:
// - Public types never carry credentials (password hashes stay in storage rows)
// - JSON uses camelCase to match the web front-end
// - utoipa schemas are opt-in via the "openapi" feature

// Telemetry (tracing subscriber setup)
pub mod telemetry;

// Domain entity types
pub mod download;
pub mod user;

// Re-exports for convenience
pub use download::{
    DownloadEvent, DownloadHistory, DownloadReceipt, DownloadStats, RecentDownload,
    DEFAULT_DOWNLOAD_VERSION, RECENT_DOWNLOADS_LIMIT,
};
pub use user::{User, UserIdentity, UserProfile, UserStats};
