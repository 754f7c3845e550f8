// JWT token service for authentication
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Tokens are stateless; nothing is persisted and there is no
// revocation list, so a token stays valid until it expires
// Decision: Expiry is checked here against an explicit clock reading with
// zero leeway instead of by jsonwebtoken's wall-clock check

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::config::JwtConfig;

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Returned for every verification failure. The cause is only logged.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a session token for a user, valid from now
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a session token as if the current time were `now`
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let exp = Duration::from_std(self.config.token_lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .context("Token lifetime out of range")?;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Verify a token against the wall clock
    pub fn verify(&self, token: &str) -> Result<Uuid, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, algorithm and expiry as of `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, InvalidToken> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                InvalidToken
            })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            tracing::debug!("JWT validation failed: token expired");
            return Err(InvalidToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::debug!("JWT validation failed: subject is not a user id");
            InvalidToken
        })
    }

    /// Get token lifetime in seconds
    pub fn token_lifetime_secs(&self) -> i64 {
        i64::try_from(self.config.token_lifetime.as_secs()).unwrap_or(i64::MAX)
    }
}
