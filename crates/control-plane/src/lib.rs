// Pupillix Control Plane Library
// Decision: Shared library for binaries (API server, operator tools) and
// integration tests

// Router assembly
pub mod app;

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Authentication module
pub mod auth;

// Server configuration
pub mod config;

// Error taxonomy for HTTP handlers
pub mod error;

// Services layer
pub mod services;

// Storage layer
pub mod storage;

// OpenAPI spec generation
pub mod openapi;

pub use app::build_app;
pub use error::{ApiError, ApiResult};
