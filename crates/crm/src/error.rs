//! Error taxonomy for the CRM synchronization layer.
//!
//! Every failure a screen can observe is one of four kinds: the credential
//! exchange was rejected, the CRM rejected the request, the network failed,
//! or the input never left the device. Mapping shortfalls are *not* errors;
//! the mapper degrades to documented defaults instead of failing a list.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when interacting with the CRM.
#[derive(Debug, Error)]
pub enum CrmError {
    /// Credential exchange failed or a request was rejected with 401 after
    /// the single re-acquisition attempt.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The CRM rejected the request (non-auth 4xx/5xx). The server-provided
    /// message is preserved verbatim.
    #[error("CRM request failed ({status}): {message}")]
    Remote {
        /// HTTP status code returned by the CRM.
        status: u16,
        /// Server-provided error message.
        message: String,
    },

    /// Transport-level failure (timeout, DNS, connection reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The CRM response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Programmer error at query construction (unknown field, bad name).
    #[error("Invalid query: {0}")]
    Query(String),

    /// Input rejected locally before any request was issued.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CrmError {
    /// Classify the error for the UI.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            // A malformed response is a broken remote contract, not a local bug.
            Self::Remote { .. } | Self::Parse(_) => ErrorKind::Remote,
            Self::Network(_) => ErrorKind::Network,
            Self::Query(_) | Self::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// UI-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential exchange or unrecoverable 401.
    Auth,
    /// The CRM rejected the request.
    Remote,
    /// Transport-level failure.
    Network,
    /// Input rejected before any request was issued.
    Validation,
}

/// Cloneable error snapshot held in a [`SyncState`](crate::sync::SyncState).
///
/// [`CrmError`] wraps non-`Clone` sources (`reqwest::Error`), so the
/// orchestrator stores this flattened form for screens to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncError {
    /// Classification for the UI.
    pub kind: ErrorKind,
    /// User-visible message.
    pub message: String,
}

impl From<&CrmError> for SyncError {
    fn from(err: &CrmError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrmError::Auth("invalid client credentials".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: invalid client credentials"
        );

        let err = CrmError::Remote {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "CRM request failed (500): internal error");
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(CrmError::Auth(String::new()).kind(), ErrorKind::Auth);
        assert_eq!(
            CrmError::Remote {
                status: 400,
                message: String::new()
            }
            .kind(),
            ErrorKind::Remote
        );
        assert_eq!(CrmError::Query(String::new()).kind(), ErrorKind::Validation);
        assert_eq!(
            CrmError::Validation(String::new()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_sync_error_snapshot() {
        let err = CrmError::Remote {
            status: 503,
            message: "service unavailable".to_string(),
        };
        let snapshot = SyncError::from(&err);
        assert_eq!(snapshot.kind, ErrorKind::Remote);
        assert_eq!(
            snapshot.message,
            "CRM request failed (503): service unavailable"
        );
    }

    #[test]
    fn test_parse_errors_classify_as_remote() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(CrmError::Parse(parse_err).kind(), ErrorKind::Remote);
    }
}
