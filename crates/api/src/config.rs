//! API server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARU_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MARU_API_HOST` - Bind address (default: 127.0.0.1)
//! - `MARU_API_PORT` - Listen port (default: 3000)
//! - `MARU_LOG_JSON` - Emit JSON logs when set to anything but `0`/`false`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.1)
//!
//! Shop settings (shipping tier, currency symbol) come from
//! [`maru_commerce::config::ShopConfig`].

use std::net::{IpAddr, SocketAddr};

use maru_commerce::config::{ConfigError, ShopConfig};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Database, shipping and currency settings
    pub shop: ShopConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let shop = ShopConfig::from_env()?;

        let host = parse_env("MARU_API_HOST", "127.0.0.1")?;
        let port = parse_env("MARU_API_PORT", "3000")?;
        let log_json = std::env::var("MARU_LOG_JSON").is_ok_and(|v| is_truthy(&v));

        let sentry_dsn = std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty());
        let sentry_environment = std::env::var("SENTRY_ENVIRONMENT").ok();
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?;

        Ok(Self {
            shop,
            host,
            port,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    let rate: f32 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| {
            ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
        })?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ));
    }
    Ok(rate)
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false")
}
