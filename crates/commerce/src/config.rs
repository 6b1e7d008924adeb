//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARU_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MARU_FREE_SHIPPING_THRESHOLD` - Subtotal at which shipping is free (default: 100000)
//! - `MARU_SHIPPING_FEE` - Flat fee below the threshold (default: 4000)
//! - `MARU_CURRENCY_SYMBOL` - Prefix used when rendering money (default: ₩)

use std::str::FromStr;

use maru_core::Money;
use secrecy::SecretString;
use thiserror::Error;

use crate::services::totals::ShippingPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop-wide configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Free-shipping threshold and flat fee
    pub shipping: ShippingPolicy,
    /// Prefix for rendered amounts
    pub currency_symbol: String,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or a numeric
    /// setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("MARU_DATABASE_URL")?,
            shipping: shipping_from_env()?,
            currency_symbol: get_env_or_default("MARU_CURRENCY_SYMBOL", "₩"),
        })
    }
}

/// Read only the shipping settings, for callers that never touch the database.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is not a whole number or
/// is negative.
pub fn shipping_from_env() -> Result<ShippingPolicy, ConfigError> {
    let defaults = ShippingPolicy::default();
    let free_threshold = parse_money_env(
        "MARU_FREE_SHIPPING_THRESHOLD",
        defaults.free_threshold.units(),
    )?;
    let flat_fee = parse_money_env("MARU_SHIPPING_FEE", defaults.flat_fee.units())?;

    Ok(ShippingPolicy {
        free_threshold,
        flat_fee,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_money_env(key: &str, default: i64) -> Result<Money, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(Money::new(default));
    };
    let units = parse_units(&raw)
        .map_err(|reason| ConfigError::InvalidEnvVar(key.to_string(), reason))?;
    Ok(Money::new(units))
}

fn parse_units(raw: &str) -> Result<i64, String> {
    let units = i64::from_str(raw.trim()).map_err(|e| e.to_string())?;
    if units < 0 {
        return Err("must not be negative".to_string());
    }
    Ok(units)
}
