//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.
//! Every collaborator is optional: a missing URL or directory selects the
//! in-memory or no-op fallback.

use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 50)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 25)
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (default: 120, OCR can be slow)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// PostgreSQL URL; in-memory records when unset
    pub database_url: Option<String>,
    /// Database connection pool maximum connections (default: 20)
    pub database_max_connections: u32,
    /// Database connection pool minimum connections (default: 2)
    pub database_min_connections: u32,
    /// Directory for evidence blobs; in-memory blobs when unset
    pub blob_dir: Option<PathBuf>,
    /// Base URL of the `/blobs` route (default: http://localhost:3000/blobs,
    /// derived from HOST and PORT when loaded from env)
    pub blob_base_url: String,
    /// OCR service base URL; images yield empty text when unset
    pub ocr_service_url: Option<Url>,
    /// Upper bound on one OCR call in seconds (default: 60)
    pub ocr_timeout_secs: u64,
    /// Remote analysis service base URL; local classifier only when unset
    pub analysis_service_url: Option<Url>,
    /// Upper bound on one remote analysis in seconds (default: 30)
    pub analysis_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 50,
            max_file_size_mb: 25,
            timeout_secs: 120,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            database_url: None,
            database_max_connections: 20,
            database_min_connections: 2,
            blob_dir: None,
            blob_base_url: "http://localhost:3000/blobs".to_string(),
            ocr_service_url: None,
            ocr_timeout_secs: 60,
            analysis_service_url: None,
            analysis_timeout_secs: 30,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a collaborator URL, warning and ignoring it when malformed.
fn env_service_url(name: &str) -> Option<Url> {
    let raw = env_non_empty(name)?;
    match parse_service_url(&raw) {
        Ok(url) => Some(url),
        Err(reason) => {
            tracing::warn!(var = name, value = %raw, error = %reason, "Ignoring invalid service URL");
            None
        }
    }
}

/// Accept only absolute http(s) URLs.
pub fn parse_service_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let port = env_parse("PORT", defaults.port);
        let blob_base_url = env_non_empty("BLOB_BASE_URL").unwrap_or_else(|| {
            let [a, b, c, d] = host;
            let host = if host == [0, 0, 0, 0] {
                "localhost".to_string()
            } else {
                format!("{a}.{b}.{c}.{d}")
            };
            format!("http://{host}:{port}/blobs")
        });

        Self {
            port,
            host,
            allowed_origins,
            body_limit_mb: env_parse("BODY_LIMIT_MB", defaults.body_limit_mb),
            max_file_size_mb: env_parse("MAX_FILE_SIZE_MB", defaults.max_file_size_mb),
            timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", defaults.timeout_secs),
            rate_limit_enabled,
            rate_limit_per_sec: env_parse("RATE_LIMIT_PER_SEC", defaults.rate_limit_per_sec),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST", defaults.rate_limit_burst),
            database_url: env_non_empty("DATABASE_URL"),
            database_max_connections: env_parse(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            database_min_connections: env_parse(
                "DATABASE_MIN_CONNECTIONS",
                defaults.database_min_connections,
            ),
            blob_dir: env_non_empty("BLOB_DIR").map(PathBuf::from),
            blob_base_url,
            ocr_service_url: env_service_url("OCR_SERVICE_URL"),
            ocr_timeout_secs: env_parse("OCR_TIMEOUT_SECS", defaults.ocr_timeout_secs),
            analysis_service_url: env_service_url("ANALYSIS_SERVICE_URL"),
            analysis_timeout_secs: env_parse(
                "ANALYSIS_TIMEOUT_SECS",
                defaults.analysis_timeout_secs,
            ),
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Maximum upload size in bytes.
    pub fn max_file_size(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(!config.rate_limit_enabled);
        assert!(config.database_url.is_none());
        assert!(config.blob_dir.is_none());
        assert!(config.ocr_service_url.is_none());
        assert_eq!(config.max_file_size(), 25 * 1024 * 1024);
        assert_eq!(config.analysis_timeout_secs, 30);
        assert!(config.blob_base_url.ends_with("/blobs"));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            host: [0, 0, 0, 0],
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_service_url() {
        assert!(parse_service_url("http://localhost:8001").is_ok());
        assert!(parse_service_url("https://ocr.internal/v1/").is_ok());
        assert!(parse_service_url("ftp://ocr.internal").is_err());
        assert!(parse_service_url("not a url").is_err());
    }
}
