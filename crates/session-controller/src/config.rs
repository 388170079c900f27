//! Session Controller configuration.
//!
//! Configuration is loaded from environment variables. Signing secrets are
//! held as `SecretString` and redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default transport grant TTL in seconds (15 minutes).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 900;

/// Minimum allowed transport grant TTL.
pub const MIN_TOKEN_TTL_SECONDS: u64 = 60;

/// Maximum allowed transport grant TTL (1 hour).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 3600;

/// Default bcrypt cost for meeting passwords.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Session Controller configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// External real-time transport endpoint handed to clients.
    pub transport_url: String,

    /// API key identifying this service to the transport.
    pub transport_api_key: String,

    /// HS256 secret used to sign transport grants.
    pub transport_api_secret: SecretString,

    /// HS256 secret used to sign recording share tokens.
    pub share_token_secret: SecretString,

    /// Transport grant TTL in seconds.
    pub token_ttl_seconds: u64,

    /// Bcrypt cost for hashing meeting passwords.
    pub bcrypt_cost: u32,
}

/// Custom Debug implementation that redacts secrets. `SecretString` already
/// redacts itself; the derive is avoided so new fields get reviewed here.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("transport_url", &self.transport_url)
            .field("transport_api_key", &self.transport_api_key)
            .field("transport_api_secret", &"[REDACTED]")
            .field("share_token_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token TTL configuration: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// fail validation.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let transport_url = vars
            .get("TRANSPORT_URL")
            .cloned()
            .unwrap_or_else(|| "wss://localhost:7880".to_string());

        let transport_api_key = vars
            .get("TRANSPORT_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("TRANSPORT_API_KEY".to_string()))?
            .clone();

        let transport_api_secret = vars
            .get("TRANSPORT_API_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("TRANSPORT_API_SECRET".to_string()))?
            .clone();

        let share_token_secret = vars
            .get("SHARE_TOKEN_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("SHARE_TOKEN_SECRET".to_string()))?
            .clone();

        let token_ttl_seconds = if let Some(value_str) = vars.get("TOKEN_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if !(MIN_TOKEN_TTL_SECONDS..=MAX_TOKEN_TTL_SECONDS).contains(&value) {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "TOKEN_TTL_SECONDS must be between {} and {}, got {}",
                    MIN_TOKEN_TTL_SECONDS, MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_TOKEN_TTL_SECONDS
        };

        let bcrypt_cost = if let Some(value_str) = vars.get("BCRYPT_COST") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            // bcrypt's own supported range.
            if !(4..=31).contains(&value) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "BCRYPT_COST must be between 4 and 31, got {}",
                    value
                )));
            }

            value
        } else {
            DEFAULT_BCRYPT_COST
        };

        Ok(Config {
            bind_address,
            transport_url,
            transport_api_key,
            transport_api_secret: SecretString::from(transport_api_secret.as_str()),
            share_token_secret: SecretString::from(share_token_secret.as_str()),
            token_ttl_seconds,
            bcrypt_cost,
        })
    }
}
