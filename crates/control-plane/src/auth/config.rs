// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Missing signing secret falls back to a random per-process key, so
// tokens do not survive a restart

use std::time::Duration;

use rand::Rng;

use crate::storage::Argon2Params;

/// Default session lifetime: 7 days
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Longest accepted session lifetime: 365 days
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Session token lifetime
    pub token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: generate_secret(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Cost parameters for new password hashes
    pub argon2: Argon2Params,
}

fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

/// Resolve a configured lifetime in seconds; zero means default, larger
/// than `MAX_TOKEN_LIFETIME` is capped
fn resolve_token_lifetime(secs: Option<u64>) -> Duration {
    match secs {
        None | Some(0) => DEFAULT_TOKEN_LIFETIME,
        Some(secs) if secs > MAX_TOKEN_LIFETIME.as_secs() => {
            tracing::warn!(
                "AUTH_TOKEN_LIFETIME {} exceeds maximum, capping at {} seconds",
                secs,
                MAX_TOKEN_LIFETIME.as_secs()
            );
            MAX_TOKEN_LIFETIME
        }
        Some(secs) => Duration::from_secs(secs),
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let secret = match std::env::var("AUTH_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "AUTH_JWT_SECRET not set, using a random per-process secret; \
                     sessions will not survive a restart"
                );
                generate_secret()
            }
        };

        let token_lifetime = resolve_token_lifetime(env_parse::<u64>("AUTH_TOKEN_LIFETIME"));

        let defaults = Argon2Params::default();
        let argon2 = Argon2Params {
            memory_kib: env_parse("AUTH_ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("AUTH_ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("AUTH_ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
        };

        Self {
            jwt: JwtConfig {
                secret,
                token_lifetime,
            },
            argon2,
        }
    }
}
