// Router assembly
// Decision: All state is built here once and injected per area; no globals
// Decision: The OpenAPI document is served as JSON only (no bundled UI)

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api;
use crate::auth::{self, AuthConfig, AuthState};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::services::{DownloadService, UserService};
use crate::storage::StorageBackend;

/// Build the complete application router
pub fn build_app(config: &ServerConfig, auth_config: AuthConfig, db: Arc<StorageBackend>) -> Router {
    let auth_state = AuthState::new(auth_config, db.clone());

    let download_service = Arc::new(DownloadService::new(
        db.clone(),
        config.download_url.clone(),
    ));
    let users_state = api::users::UsersState {
        service: Arc::new(UserService::new(db.clone())),
        downloads: download_service.clone(),
        auth: auth_state.clone(),
    };
    let downloads_state = api::downloads::DownloadsState {
        service: download_service,
        auth: auth_state.clone(),
    };
    let health_state = api::health::HealthState {
        storage: db.kind(),
        started_at: Instant::now(),
    };

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let api_routes = Router::new()
        .merge(auth::routes(auth_state))
        .merge(api::downloads::routes(downloads_state))
        .merge(api::users::routes(users_state))
        .merge(api::health::routes(health_state));

    let app = build_router_with_prefix(api_routes, &config.api_prefix)
        .route("/api-doc/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .fallback(route_not_found);

    let app = match cors_layer(&config.cors_allowed_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        return None;
    }
    tracing::info!(origins = ?origins, "CORS origins configured");

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
                header::ORIGIN,
            ]),
    )
}

pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
