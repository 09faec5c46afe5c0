//! Credential lifecycle for the CRM connection.
//!
//! Handles the client-credentials exchange to obtain time-boxed bearer
//! tokens for API access, caches the result in memory, and guarantees that
//! concurrent callers share a single in-flight exchange.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::config::CrmConfig;
use crate::error::CrmError;

/// Safety margin before the reported expiry at which a credential is
/// treated as expired, so a token is never handed out mid-request with
/// seconds to live.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Time-boxed bearer credential obtained from the token endpoint.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Bearer token for API requests.
    pub access_token: SecretString,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
    /// Lifetime in seconds reported by the token endpoint, or the
    /// configured fallback when the endpoint omitted it.
    pub expires_in_secs: i64,
}

impl Credential {
    /// Unix timestamp past which the credential must not be used.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.obtained_at + self.expires_in_secs
    }

    /// Check if the credential has expired (with safety margin).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at() - EXPIRY_MARGIN_SECS
    }
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds. Some CRM configurations omit this.
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Error response from the token endpoint.
#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Process-wide provider of valid bearer credentials.
///
/// Cheap to clone; all clones share one credential cache, which is the only
/// state shared across sync orchestrators. Acquisition is single-flight:
/// the cache lock is held across the exchange, so callers that arrive while
/// an exchange is in flight wait for it and reuse its result instead of
/// issuing duplicate exchanges.
#[derive(Clone)]
pub struct CredentialProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    fallback_ttl_secs: i64,
    /// In-memory credential cache
    cache: Mutex<Option<Credential>>,
}

impl CredentialProvider {
    /// Create a provider backed by the given HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &CrmConfig) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                http,
                token_url: config.token_url(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                fallback_ttl_secs: config.fallback_token_ttl_secs,
                cache: Mutex::new(None),
            }),
        }
    }

    /// Return a valid bearer token, exchanging credentials if needed.
    ///
    /// Returns the cached token while it is fresh. Otherwise performs the
    /// client-credentials exchange exactly once, even under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Auth` if the exchange is rejected and
    /// `CrmError::Network` on transport failure. Neither is retried here;
    /// the failure belongs to the calling operation.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<String, CrmError> {
        let mut cache = self.inner.cache.lock().await;

        if let Some(credential) = cache.as_ref()
            && !credential.is_expired()
        {
            return Ok(credential.access_token.expose_secret().to_string());
        }

        let credential = self.exchange().await?;
        let token = credential.access_token.expose_secret().to_string();
        *cache = Some(credential);

        Ok(token)
    }

    /// Discard the cached credential, forcing the next `access_token` call
    /// to re-exchange. Called by the transport after a 401.
    pub async fn invalidate(&self) {
        *self.inner.cache.lock().await = None;
    }

    /// Check if a non-expired credential is currently cached.
    pub async fn has_valid_credential(&self) -> bool {
        self.inner
            .cache
            .lock()
            .await
            .as_ref()
            .is_some_and(|credential| !credential.is_expired())
    }

    /// Perform the client-credentials exchange.
    #[instrument(skip(self), fields(token_url = %self.inner.token_url))]
    async fn exchange(&self) -> Result<Credential, CrmError> {
        let now = chrono::Utc::now().timestamp();

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
        ];

        let response = self
            .inner
            .http
            .post(&self.inner.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let token_response: TokenResponse = response
                .json()
                .await
                .map_err(|e| CrmError::Auth(format!("malformed token response: {e}")))?;

            tracing::debug!(
                expires_in = token_response.expires_in,
                "credential obtained"
            );

            Ok(Credential {
                access_token: SecretString::from(token_response.access_token),
                obtained_at: now,
                expires_in_secs: token_response
                    .expires_in
                    .unwrap_or(self.inner.fallback_ttl_secs),
            })
        } else {
            let error_response: TokenErrorResponse =
                response.json().await.unwrap_or(TokenErrorResponse {
                    error: None,
                    error_description: None,
                });

            let message = error_response
                .error_description
                .or(error_response.error)
                .unwrap_or_else(|| format!("token endpoint returned HTTP {status}"));

            Err(CrmError::Auth(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(obtained_at: i64, expires_in_secs: i64) -> Credential {
        Credential {
            access_token: SecretString::from("test"),
            obtained_at,
            expires_in_secs,
        }
    }

    #[test]
    fn test_credential_is_expired() {
        let now = chrono::Utc::now().timestamp();

        // Credential that expired an hour ago
        assert!(credential(now - 7200, 3600).is_expired());

        // Credential that expires in an hour
        assert!(!credential(now, 3600).is_expired());

        // Credential that expires in 30 seconds (inside the 60s margin)
        assert!(credential(now - 3570, 3600).is_expired());
    }

    #[test]
    fn test_expires_at() {
        let c = credential(1_700_000_000, 1800);
        assert_eq!(c.expires_at(), 1_700_001_800);
    }

    #[test]
    fn test_token_response_tolerates_missing_expiry() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token": "00Dxx!abc", "token_type": "Bearer"}"#)
                .unwrap();
        assert_eq!(parsed.access_token, "00Dxx!abc");
        assert!(parsed.expires_in.is_none());
    }
}
