//! CRM connection configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CRM_BASE_URL` - Base URL of the CRM instance (no trailing slash needed)
//! - `CRM_CLIENT_ID` - OAuth client ID for the client-credentials exchange
//! - `CRM_CLIENT_SECRET` - OAuth client secret (validated for strength)
//!
//! ## Optional
//! - `CRM_API_VERSION` - Data API version (default: v61.0)
//! - `CRM_TOKEN_TTL_SECS` - Fallback credential lifetime when the token
//!   endpoint omits `expires_in` (default: 1800)
//! - `CRM_HTTP_TIMEOUT_SECS` - HTTP client timeout (default: 30)
//!
//! The client secret never appears in `Debug` output, and obviously-fake
//! values (placeholders, low-entropy strings) are rejected at load so a
//! misconfigured deployment fails fast instead of failing on first sync.

use std::collections::HashMap;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

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

/// CRM connection configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct CrmConfig {
    /// Base URL of the CRM instance, without a trailing slash.
    pub base_url: String,
    /// Data API version segment (e.g., v61.0).
    pub api_version: String,
    /// OAuth client ID for the client-credentials exchange.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Credential lifetime assumed when the token endpoint omits `expires_in`.
    pub fallback_token_ttl_secs: i64,
    /// HTTP client timeout in seconds.
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("fallback_token_ttl_secs", &self.fallback_token_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl CrmConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the client secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = normalize_base_url(&get_required_env("CRM_BASE_URL")?);
        let api_version = get_env_or_default("CRM_API_VERSION", "v61.0");
        let client_id = get_required_env("CRM_CLIENT_ID")?;
        let client_secret = get_validated_secret("CRM_CLIENT_SECRET")?;

        let fallback_token_ttl_secs = get_env_or_default("CRM_TOKEN_TTL_SECS", "1800")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CRM_TOKEN_TTL_SECS".to_string(), e.to_string())
            })?;
        let http_timeout_secs = get_env_or_default("CRM_HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CRM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            api_version,
            client_id,
            client_secret,
            fallback_token_ttl_secs,
            http_timeout_secs,
        })
    }

    /// The token-exchange endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/services/oauth2/token", self.base_url)
    }

    /// The query endpoint URL (without the `q` parameter).
    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}/services/data/{}/query", self.base_url, self.api_version)
    }

    /// The command endpoint URL for a named command.
    #[must_use]
    pub fn command_url(&self, command: &str) -> String {
        format!("{}/services/apexrest/{command}", self.base_url)
    }
}

/// Strip trailing slashes so URL assembly never doubles them.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
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

    // Check entropy (real OAuth secrets have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the CRM connected app."
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
