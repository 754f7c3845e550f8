// Authentication module
// - config: secrets, token lifetime and Argon2 cost from the environment
// - jwt: session token issue/verify
// - middleware: AuthUser extractor and shared AuthState
// - routes: signup, login, verify

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::{AuthConfig, JwtConfig};
pub use jwt::{InvalidToken, JwtService};
pub use middleware::{AuthState, AuthUser};
pub use routes::routes;
