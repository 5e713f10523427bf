use std::path::PathBuf;

use onramp_core::session::DEFAULT_TOKEN_TTL_DAYS;

use crate::auth::jwt::JwtConfig;

/// Default ceiling for a single learner upload (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of a renewed learner session token, in days (default: `7`).
    pub session_token_ttl_days: i64,
    /// Largest accepted learner upload in bytes.
    pub max_upload_bytes: usize,
    /// Root directory of the local storage backend.
    pub local_storage_path: PathBuf,
    /// Public URL prefix under which stored files are served.
    pub storage_public_url: String,
    /// JWT token configuration for admin endpoints.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                       |
    /// |--------------------------|-----------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                     |
    /// | `PORT`                   | `3000`                                        |
    /// | `CORS_ORIGINS`           | `http://localhost:3000,http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                          |
    /// | `SESSION_TOKEN_TTL_DAYS` | `7`                                           |
    /// | `MAX_UPLOAD_BYTES`       | `10485760`                                    |
    /// | `LOCAL_STORAGE_PATH`     | `./uploads`                                   |
    /// | `STORAGE_PUBLIC_URL`     | `/uploads`                                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_token_ttl_days: i64 = std::env::var("SESSION_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_DAYS.to_string())
            .parse()
            .expect("SESSION_TOKEN_TTL_DAYS must be a valid i64");
        assert!(
            session_token_ttl_days > 0,
            "SESSION_TOKEN_TTL_DAYS must be positive"
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let local_storage_path = std::env::var("LOCAL_STORAGE_PATH")
            .unwrap_or_else(|_| "./uploads".into())
            .into();

        let storage_public_url =
            std::env::var("STORAGE_PUBLIC_URL").unwrap_or_else(|_| "/uploads".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_token_ttl_days,
            max_upload_bytes,
            local_storage_path,
            storage_public_url,
            jwt,
        }
    }

    /// Validity window of a renewed session token.
    pub fn session_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_token_ttl_days)
    }
}
