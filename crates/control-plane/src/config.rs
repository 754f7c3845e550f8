// Server configuration loaded from environment variables.
// Decision: No DATABASE_URL means dev mode with in-memory storage
// Decision: CORS stays disabled unless origins are listed explicitly

use anyhow::{Context, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DOWNLOAD_URL: &str = "https://example.com/pupillix/latest";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string; `None` selects in-memory storage
    pub database_url: Option<String>,
    /// Optional path prefix for every API route (e.g. "/v2")
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
    /// Product link returned when a download is tracked
    pub download_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            api_prefix: String::new(),
            cors_allowed_origins: Vec::new(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let download_url = non_empty_var("DOWNLOAD_URL").unwrap_or_else(|| {
            tracing::warn!(
                "DOWNLOAD_URL not set, using placeholder {}",
                DEFAULT_DOWNLOAD_URL
            );
            defaults.download_url
        });

        Ok(Self {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
            database_url: non_empty_var("DATABASE_URL"),
            api_prefix: non_empty_var("API_PREFIX").unwrap_or_default(),
            cors_allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or_default(),
            download_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert!(config.database_url.is_none());
        assert!(config.api_prefix.is_empty());
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://pupillix.app ,"),
            vec!["http://localhost:3000", "https://pupillix.app"]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
