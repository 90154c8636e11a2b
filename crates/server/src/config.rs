//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `CRON_SECRET` - Shared secret for the scheduled sync entrypoint
//! - `SHOPIFY_STORE_ONE_URL` - Store one domain (e.g., store-one.myshopify.com)
//! - `SHOPIFY_STORE_ONE_ACCESS_TOKEN` - Store one Admin API access token
//! - `SHOPIFY_STORE_ONE_WEBHOOK_SECRET` - Store one webhook signing secret
//! - `SHOPIFY_STORE_TWO_URL` - Store two domain
//! - `SHOPIFY_STORE_TWO_ACCESS_TOKEN` - Store two Admin API access token
//! - `SHOPIFY_STORE_TWO_WEBHOOK_SECRET` - Store two webhook signing secret
//!
//! ## Optional
//! - `SERVER_HOST` - Bind address (default: 127.0.0.1)
//! - `SERVER_PORT` - Listen port (default: 3002)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-01)
//! - `SHOPIFY_STORE_ONE_LOCATION_ID` - Default location for store one
//! - `SHOPIFY_STORE_TWO_LOCATION_ID` - Default location for store two
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use stockroom_core::Storefront;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shared secret for the scheduled sync entrypoint
    pub cron_secret: SecretString,
    /// Shopify storefront connections
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Configuration for both Shopify storefront connections.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Admin API version (e.g., 2025-01)
    pub api_version: String,
    /// Store one credentials
    pub store_one: StoreConfig,
    /// Store two credentials
    pub store_two: StoreConfig,
}

impl ShopifyConfig {
    /// Credentials for the given storefront.
    #[must_use]
    pub const fn store(&self, store: Storefront) -> &StoreConfig {
        match store {
            Storefront::StoreOne => &self.store_one,
            Storefront::StoreTwo => &self.store_two,
        }
    }

    /// Resolve a storefront by its configured shop domain.
    ///
    /// Used by the webhook handler to map an inbound notification's claimed
    /// source domain to the right signing secret. Unknown domains return
    /// `None` and are rejected before the payload is parsed.
    #[must_use]
    pub fn store_for_domain(&self, domain: &str) -> Option<Storefront> {
        Storefront::ALL
            .into_iter()
            .find(|&store| self.store(store).domain == domain)
    }
}

/// Credentials and defaults for one storefront connection.
///
/// Implements `Debug` manually to redact the access token and webhook
/// secret.
#[derive(Clone)]
pub struct StoreConfig {
    /// Shop domain (e.g., store-one.myshopify.com)
    pub domain: String,
    /// Admin API access token (HIGH PRIVILEGE - redacted in debug output)
    pub access_token: SecretString,
    /// Default location the store's inventory is reconciled at
    pub location_id: Option<String>,
    /// Webhook signing secret for order notifications
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("domain", &self.domain)
            .field("access_token", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("SERVER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SERVER_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_PORT".to_string(), e.to_string()))?;
        let cron_secret = get_validated_secret("CRON_SECRET")?;

        let shopify = ShopifyConfig {
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            store_one: StoreConfig::from_env("SHOPIFY_STORE_ONE")?,
            store_two: StoreConfig::from_env("SHOPIFY_STORE_TWO")?,
        };

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
            cron_secret,
            shopify,
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

impl StoreConfig {
    /// Load one store's credential block from `{prefix}_URL`,
    /// `{prefix}_ACCESS_TOKEN`, `{prefix}_LOCATION_ID` and
    /// `{prefix}_WEBHOOK_SECRET`.
    fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            domain: get_required_env(&format!("{prefix}_URL"))?,
            access_token: get_validated_secret(&format!("{prefix}_ACCESS_TOKEN"))?,
            location_id: get_optional_env(&format!("{prefix}_LOCATION_ID")),
            webhook_secret: get_validated_secret(&format!("{prefix}_WEBHOOK_SECRET"))?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
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
