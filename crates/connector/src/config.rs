//! Connector configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CONNECTOR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CONNECTOR_ADMIN_TOKEN` - Bearer token for the admin endpoints (min 32 chars, high entropy)
//! - `IIKO_API_LOGIN` - iiko Cloud API login
//!
//! ## Optional
//! - `CONNECTOR_HOST` - Bind address (default: 127.0.0.1)
//! - `CONNECTOR_PORT` - Listen port (default: 3002)
//! - `IIKO_API_URL` - API base URL (default: <https://api-ru.iiko.services/api/1/>)
//! - `IIKO_ORGANIZATION_ID` - Default organization for exports
//! - `IIKO_TERMINAL_GROUP_ID` - Default terminal group for exports
//! - `IIKO_DEFAULT_STREET` - Street name used when an order has no known street
//! - `IIKO_DEFAULT_CITY` - City name used when the billing city is blank
//! - `IIKO_TIMEOUT_SECS` - HTTP timeout for iiko calls (default: 30)
//! - `NOMENCLATURE_CACHE_TTL_SECS` - Cached nomenclature lifetime (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use iiko_connector_core::{OrganizationId, TerminalGroupId};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
pub const DEFAULT_IIKO_API_URL: &str = "https://api-ru.iiko.services/api/1/";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Connector application configuration.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token protecting the admin endpoints
    pub admin_token: SecretString,
    /// iiko API configuration
    pub iiko: IikoConfig,
    /// Address fallbacks for delivery mapping
    pub delivery: DeliveryDefaults,
    /// Lifetime of cached nomenclature lists in seconds
    pub cache_ttl_secs: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// iiko Cloud API configuration.
///
/// Implements `Debug` manually to redact the API login.
#[derive(Clone)]
pub struct IikoConfig {
    /// Base URL, always ending in `/`
    pub api_url: Url,
    /// API login exchanged for access tokens
    pub api_login: SecretString,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Organization used when none is stored in settings
    pub organization_id: Option<OrganizationId>,
    /// Terminal group used when none is stored in settings
    pub terminal_group_id: Option<TerminalGroupId>,
}

impl std::fmt::Debug for IikoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IikoConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_login", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("organization_id", &self.organization_id)
            .field("terminal_group_id", &self.terminal_group_id)
            .finish()
    }
}

/// Address values substituted when an order lacks them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDefaults {
    pub street: String,
    pub city: String,
}

impl ConnectorConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CONNECTOR_DATABASE_URL")?;
        let host = get_env_or_default("CONNECTOR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONNECTOR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CONNECTOR_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONNECTOR_PORT".to_string(), e.to_string()))?;
        let admin_token = get_validated_secret("CONNECTOR_ADMIN_TOKEN")?;
        validate_admin_token(&admin_token, "CONNECTOR_ADMIN_TOKEN")?;

        let iiko = IikoConfig::from_env()?;
        let delivery = DeliveryDefaults::from_env();
        let cache_ttl_secs = parse_env_or_default("NOMENCLATURE_CACHE_TTL_SECS", 86_400)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            admin_token,
            iiko,
            delivery,
            cache_ttl_secs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DeliveryDefaults {
    /// Read `IIKO_DEFAULT_STREET` and `IIKO_DEFAULT_CITY`; both default to empty.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            street: get_env_or_default("IIKO_DEFAULT_STREET", ""),
            city: get_env_or_default("IIKO_DEFAULT_CITY", ""),
        }
    }
}

impl IikoConfig {
    /// Load only the iiko section (used by the CLI, which has no admin token).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the login is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_env_or_default("IIKO_API_URL", DEFAULT_IIKO_API_URL);
        let api_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("IIKO_API_URL".to_string(), e))?;

        let api_login = get_required_secret("IIKO_API_LOGIN")?;
        if api_login.expose_secret().trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "IIKO_API_LOGIN".to_string(),
                "cannot be blank".to_string(),
            ));
        }

        let organization_id = get_optional_pos_id("IIKO_ORGANIZATION_ID", OrganizationId::parse)?;
        let terminal_group_id =
            get_optional_pos_id("IIKO_TERMINAL_GROUP_ID", TerminalGroupId::parse)?;

        Ok(Self {
            api_url,
            api_login,
            timeout_secs: parse_env_or_default("IIKO_TIMEOUT_SECS", 30)?,
            organization_id,
            terminal_group_id,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, forcing a trailing slash so `Url::join` appends paths.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| e.to_string())
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn get_optional_pos_id<T, E: std::fmt::Display>(
    key: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError> {
    get_optional_env(key)
        .map(|raw| parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())))
        .transpose()
}

/// Validate that the admin token meets minimum length requirements.
fn validate_admin_token(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_TOKEN_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-admin-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_admin_token_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_admin_token(&secret, "TEST_TOKEN").is_err());
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_admin_token(&secret, "TEST_TOKEN").is_ok());
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://api-ru.iiko.services/api/1").unwrap();
        assert_eq!(url.as_str(), "https://api-ru.iiko.services/api/1/");
        assert_eq!(
            url.join("nomenclature").unwrap().as_str(),
            "https://api-ru.iiko.services/api/1/nomenclature"
        );
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ConnectorConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3002,
            admin_token: SecretString::from("x".repeat(32)),
            iiko: IikoConfig {
                api_url: Url::parse(DEFAULT_IIKO_API_URL).unwrap(),
                api_login: SecretString::from("0a1b2c3d"),
                timeout_secs: 30,
                organization_id: None,
                terminal_group_id: None,
            },
            delivery: DeliveryDefaults::default(),
            cache_ttl_secs: 86_400,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
    }

    #[test]
    fn test_iiko_config_debug_redacts_login() {
        let config = IikoConfig {
            api_url: Url::parse(DEFAULT_IIKO_API_URL).unwrap(),
            api_login: SecretString::from("super_private_login"),
            timeout_secs: 30,
            organization_id: Some(OrganizationId::new("org-1")),
            terminal_group_id: None,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api-ru.iiko.services"));
        assert!(debug_output.contains("org-1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_login"));
    }
}
