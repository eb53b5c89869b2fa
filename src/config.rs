//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Store Connection
//!
//! ### Method 1: Full URL
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! ```
//!
//! ### Method 2: Individual components
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! If neither is set, counts are kept in memory and lost on restart.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `VIEWS_KEY_PREFIX` - Redis key namespace (default: `views:`)
//! - `ALLOWED_ORIGINS` - Comma-separated trusted origins for `POST /api/views/{slug}`
//!   (default: `https://blog.nahian.xyz,http://localhost:4321`)
//! - `ARTICLE_PREFIX` - Path prefix of article pages counted on render (default: `/blog/`)
//! - `ASSETS_DIR` - Built static site directory (default: `dist`)
//! - `VIEW_QUEUE_CAPACITY` - Page view buffer size (default: 10000, min: 100)
//! - `VIEW_WORKER_CONCURRENCY` - Concurrent background increments (default: 4)
//! - `VIEW_RETRY_ATTEMPTS` - Attempts per background increment (default: 3)
//! - `STORE_TIMEOUT_MS` - Timeout for each store call (default: 2000)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::view_worker::ViewWorkerConfig;

const DEFAULT_ALLOWED_ORIGINS: &str = "https://blog.nahian.xyz,http://localhost:4321";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection string. `None` selects the in-memory store.
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub allowed_origins: Vec<String>,
    pub article_prefix: String,
    pub assets_dir: String,
    pub view_queue_capacity: usize,
    pub view_worker_concurrency: usize,
    pub view_retry_attempts: usize,
    pub store_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let redis_url = Self::load_redis_url();

        let key_prefix = env::var("VIEWS_KEY_PREFIX").unwrap_or_else(|_| "views:".to_string());
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let allowed_origins = parse_list(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let article_prefix = env::var("ARTICLE_PREFIX").unwrap_or_else(|_| "/blog/".to_string());
        let assets_dir = env::var("ASSETS_DIR").unwrap_or_else(|_| "dist".to_string());

        Ok(Self {
            redis_url,
            key_prefix,
            listen_addr,
            log_level,
            log_format,
            allowed_origins,
            article_prefix,
            assets_dir,
            view_queue_capacity: parse_var("VIEW_QUEUE_CAPACITY", 10_000)?,
            view_worker_concurrency: parse_var("VIEW_WORKER_CONCURRENCY", 4)?,
            view_retry_attempts: parse_var("VIEW_RETRY_ATTEMPTS", 3)?,
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", 2000)?,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        // Empty password means no authentication
        let url = match env::var("REDIS_PASSWORD") {
            Ok(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `view_queue_capacity` is outside 100..=1_000_000
    /// - `view_worker_concurrency` is outside 1..=256
    /// - `view_retry_attempts` is outside 1..=10
    /// - `store_timeout_ms` is 0
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr`, `redis_url`, `article_prefix` or an allowed origin is malformed
    pub fn validate(&self) -> Result<()> {
        if self.view_queue_capacity < 100 {
            anyhow::bail!(
                "VIEW_QUEUE_CAPACITY must be at least 100, got {}",
                self.view_queue_capacity
            );
        }

        if self.view_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "VIEW_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.view_queue_capacity
            );
        }

        if self.view_worker_concurrency == 0 || self.view_worker_concurrency > 256 {
            anyhow::bail!(
                "VIEW_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.view_worker_concurrency
            );
        }

        if self.view_retry_attempts == 0 || self.view_retry_attempts > 10 {
            anyhow::bail!(
                "VIEW_RETRY_ATTEMPTS must be between 1 and 10, got {}",
                self.view_retry_attempts
            );
        }

        if self.store_timeout_ms == 0 {
            anyhow::bail!("STORE_TIMEOUT_MS must be greater than 0");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if !self.article_prefix.starts_with('/') || !self.article_prefix.ends_with('/') {
            anyhow::bail!(
                "ARTICLE_PREFIX must start and end with '/', got '{}'",
                self.article_prefix
            );
        }

        if self.article_prefix.starts_with("/api/") {
            anyhow::bail!("ARTICLE_PREFIX must not overlap the /api/ namespace");
        }

        for origin in &self.allowed_origins {
            validate_origin(origin)
                .with_context(|| format!("Invalid entry in ALLOWED_ORIGINS: '{}'", origin))?;
        }

        Ok(())
    }

    /// Returns whether counts are persisted in Redis.
    pub fn is_redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn worker_config(&self) -> ViewWorkerConfig {
        ViewWorkerConfig {
            concurrency: self.view_worker_concurrency,
            retry_attempts: self.view_retry_attempts,
            ..ViewWorkerConfig::default()
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!(
                "  Store: Redis {} (prefix '{}')",
                mask_connection_string(redis_url),
                self.key_prefix
            );
        } else {
            tracing::warn!("  Store: in-memory (counts are lost on restart)");
        }

        tracing::info!("  Assets directory: {}", self.assets_dir);
        tracing::info!("  Article prefix: {}", self.article_prefix);
        tracing::info!("  Allowed origins: {}", self.allowed_origins.join(", "));
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  View queue capacity: {}", self.view_queue_capacity);
    }
}

/// Reads a numeric variable, falling back to `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// An origin is a scheme and host (plus optional port) with no path.
fn validate_origin(origin: &str) -> Result<()> {
    let parsed = url::Url::parse(origin)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("scheme must be http or https");
    }
    if parsed.host_str().is_none() {
        anyhow::bail!("origin has no host");
    }
    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        anyhow::bail!("origin must not contain a path, query or fragment");
    }

    Ok(())
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
pub fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
