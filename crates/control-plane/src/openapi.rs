// OpenAPI specification generation
//
// This module defines the OpenAPI spec for the Pupillix API.
// It is served by the API server and exported by the export-openapi binary.

use crate::api;
use crate::api::{ErrorResponse, FieldError, ListResponse};
use crate::auth;
use pupillix_core::{
    DownloadEvent, DownloadHistory, DownloadReceipt, DownloadStats, RecentDownload, User,
    UserIdentity, UserProfile, UserStats,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Pupillix API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::signup,
        auth::routes::login,
        auth::routes::verify,
        api::downloads::track_download,
        api::downloads::get_stats,
        api::users::get_profile,
        api::users::get_download_history,
        api::users::list_users,
        api::health::health,
    ),
    components(
        schemas(
            User, UserIdentity, UserProfile, UserStats,
            DownloadEvent, DownloadHistory, DownloadReceipt, DownloadStats, RecentDownload,
            auth::routes::SignupRequest,
            auth::routes::LoginRequest,
            auth::routes::AuthResponse,
            auth::routes::VerifyResponse,
            api::downloads::TrackDownloadRequest,
            api::health::HealthResponse,
            ErrorResponse, FieldError,
            ListResponse<User>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and session verification"),
        (name = "downloads", description = "Download tracking and statistics"),
        (name = "users", description = "Profiles and member listing"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "Pupillix API",
        description = "Accounts and download tracking for the Pupillix desktop app",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
