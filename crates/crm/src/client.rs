//! Transport for CRM queries and commands.
//!
//! Executes bearer-authenticated HTTP requests using the current credential.
//! A 401 means the credential went stale or was revoked server-side: the
//! client invalidates it, acquires a fresh one, and retries the request
//! exactly once. Everything else propagates unretried - validation errors
//! and server faults carry the CRM's own message up to the screen.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::auth::CredentialProvider;
use crate::config::CrmConfig;
use crate::error::CrmError;
use crate::query::QuerySpec;
use crate::record::RemoteRecord;

/// CRM transport client.
///
/// Cheap to clone; clones share the HTTP connection pool and the credential
/// provider.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: CrmConfig,
    credentials: CredentialProvider,
}

/// Envelope of the query endpoint. Extra fields (`totalSize`, `done`) are
/// tolerated and ignored.
#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<Value>,
}

/// One element of the CRM's error-array body.
#[derive(Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "errorCode")]
    error_code: Option<String>,
}

impl RemoteClient {
    /// Create a client for the configured CRM instance.
    ///
    /// Builds a dedicated HTTP client with the configured timeout and a
    /// fresh [`CredentialProvider`] sharing its connection pool.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &CrmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let credentials = CredentialProvider::new(http.clone(), config);
        Self::with_credentials(config, http, credentials)
    }

    /// Create a client reusing an existing credential provider, so several
    /// clients can share one process-wide credential cache.
    #[must_use]
    pub fn with_credentials(
        config: &CrmConfig,
        http: reqwest::Client,
        credentials: CredentialProvider,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                config: config.clone(),
                credentials,
            }),
        }
    }

    /// The credential provider backing this client.
    #[must_use]
    pub fn credentials(&self) -> &CredentialProvider {
        &self.inner.credentials
    }

    /// Execute a read query.
    ///
    /// # Errors
    ///
    /// `CrmError::Auth` when authentication fails beyond the single retry,
    /// `CrmError::Remote` for non-auth 4xx/5xx, `CrmError::Network` on
    /// transport failure, `CrmError::Parse` on a malformed response body.
    #[instrument(skip(self, spec), fields(soql = %spec.as_soql()))]
    pub async fn query(&self, spec: &QuerySpec) -> Result<Vec<RemoteRecord>, CrmError> {
        let url = format!(
            "{}?q={}",
            self.inner.config.query_url(),
            urlencoding::encode(spec.as_soql())
        );

        let response = self
            .send_authorized(|| self.inner.http.get(&url))
            .await?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response).await);
        }

        let body = response.text().await?;
        let envelope: QueryResponse = serde_json::from_str(&body)?;

        Ok(envelope
            .records
            .into_iter()
            .map(RemoteRecord::from_value)
            .collect())
    }

    /// Execute a create/update command.
    ///
    /// Returns the created/updated record echo when the CRM sends one, or
    /// `None` on an empty success body.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::query`].
    #[instrument(skip(self, payload), fields(command = %command))]
    pub async fn execute(
        &self,
        command: &str,
        payload: &Value,
    ) -> Result<Option<RemoteRecord>, CrmError> {
        let url = self.inner.config.command_url(command);

        let response = self
            .send_authorized(|| self.inner.http.post(&url).json(payload))
            .await?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response).await);
        }

        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&body)?;
        Ok(Some(RemoteRecord::from_value(value)))
    }

    /// Send a request with the current bearer token, applying the 401
    /// policy: invalidate, re-acquire once, retry once. A second 401 is an
    /// unrecoverable auth failure - no third attempt.
    async fn send_authorized(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CrmError> {
        let token = self.inner.credentials.access_token().await?;
        let response = build().bearer_auth(&token).send().await?;

        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("request rejected with 401, re-acquiring credential");
        self.inner.credentials.invalidate().await;
        let token = self.inner.credentials.access_token().await?;
        let retry = build().bearer_auth(&token).send().await?;

        if retry.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CrmError::Auth(
                "request rejected with 401 after credential re-acquisition".to_string(),
            ));
        }

        Ok(retry)
    }

    /// Build a `CrmError::Remote` preserving the server's message.
    async fn remote_error(response: reqwest::Response) -> CrmError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = error_message_from_body(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().to_string()
            }
        });

        CrmError::Remote { status, message }
    }
}

/// Extract the message from the CRM's error-array body
/// (`[{"message": "...", "errorCode": "..."}]`), if that is what we got.
fn error_message_from_body(body: &str) -> Option<String> {
    let errors: Vec<RemoteErrorBody> = serde_json::from_str(body).ok()?;

    let messages: Vec<String> = errors
        .into_iter()
        .filter_map(|e| match (e.message, e.error_code) {
            (Some(message), Some(code)) => Some(format!("{message} [{code}]")),
            (Some(message), None) => Some(message),
            (None, Some(code)) => Some(code),
            (None, None) => None,
        })
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_error_array() {
        let body = r#"[{"message": "Required fields are missing: [LastName]", "errorCode": "REQUIRED_FIELD_MISSING"}]"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("Required fields are missing: [LastName] [REQUIRED_FIELD_MISSING]")
        );
    }

    #[test]
    fn test_error_message_joins_multiple_errors() {
        let body = r#"[{"message": "first"}, {"message": "second"}]"#;
        assert_eq!(error_message_from_body(body).as_deref(), Some("first; second"));
    }

    #[test]
    fn test_error_message_from_non_array_body() {
        assert!(error_message_from_body("Internal Server Error").is_none());
        assert!(error_message_from_body("{\"message\": \"x\"}").is_none());
        assert!(error_message_from_body("[]").is_none());
    }
}
