// Services layer for business logic
// Services own business logic, calling storage directly

pub mod account;
pub mod download;
pub mod user;

pub use account::{AccountService, Session};
pub use download::{DownloadService, TrackDownload};
pub use user::UserService;
