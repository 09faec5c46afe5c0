//! Integration test harness for the Celekt CRM synchronization layer.
//!
//! Runs an in-process mock CRM with the three surfaces the client talks to:
//! the token endpoint, the query endpoint, and the command endpoints. Tests
//! script its behavior (401s, server faults, slow responses) through the
//! shared [`MockCrmState`] and observe request counters to pin down retry
//! and single-flight behavior exactly.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use celekt_crm::CrmConfig;

/// Scripted state shared between a test and the mock CRM handlers.
#[derive(Default)]
pub struct MockCrmState {
    /// Token exchanges performed so far. Token `n` is `"tok-n"`.
    pub token_exchanges: AtomicUsize,
    /// Query requests received (including ones answered with 401).
    pub query_requests: AtomicUsize,
    /// Command requests received (including ones answered with 401).
    pub command_requests: AtomicUsize,

    /// Reject the next token exchanges with `invalid_client`.
    pub reject_token_exchanges: AtomicUsize,
    /// Omit `expires_in` from token responses.
    pub omit_token_expiry: AtomicUsize,
    /// Delay applied inside the token handler, to widen the race window in
    /// single-flight tests.
    pub token_delay_ms: AtomicU64,

    /// Answer the next N data requests with 401 regardless of the bearer.
    pub scripted_unauthorized: AtomicUsize,
    /// Answer the next data request with this status and raw body.
    pub scripted_failure: Mutex<Option<(u16, String)>>,
    /// Delay applied inside the query handler.
    pub query_delay_ms: AtomicU64,

    /// Records served by the query endpoint.
    pub records: Mutex<Vec<Value>>,
    /// Last query string received.
    pub last_query: Mutex<Option<String>>,
    /// Last command received: (path, payload).
    pub last_command: Mutex<Option<(String, Value)>>,
    /// Body echoed by the command endpoint; `None` answers with an empty body.
    pub command_echo: Mutex<Option<Value>>,
}

impl MockCrmState {
    fn current_token(&self) -> String {
        format!("tok-{}", self.token_exchanges.load(Ordering::SeqCst))
    }

    /// 401 body in the CRM's error-array shape, or a scripted failure.
    async fn gate(&self, headers: &HeaderMap) -> Option<Response> {
        if self.scripted_unauthorized.load(Ordering::SeqCst) > 0 {
            self.scripted_unauthorized.fetch_sub(1, Ordering::SeqCst);
            return Some(unauthorized());
        }

        let expected = format!("Bearer {}", self.current_token());
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != expected {
            return Some(unauthorized());
        }

        if let Some((status, body)) = self.scripted_failure.lock().await.take() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Some((status, body).into_response());
        }

        None
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        json!([{"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}])
            .to_string(),
    )
        .into_response()
}

async fn token_handler(
    State(state): State<Arc<MockCrmState>>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    if params.get("grant_type").map(String::as_str) != Some("client_credentials")
        || !params.contains_key("client_id")
        || !params.contains_key("client_secret")
    {
        return (
            StatusCode::BAD_REQUEST,
            json!({"error": "unsupported_grant_type"}).to_string(),
        )
            .into_response();
    }

    if state.reject_token_exchanges.load(Ordering::SeqCst) > 0 {
        state.reject_token_exchanges.fetch_sub(1, Ordering::SeqCst);
        return (
            StatusCode::UNAUTHORIZED,
            json!({
                "error": "invalid_client",
                "error_description": "client secret rejected"
            })
            .to_string(),
        )
            .into_response();
    }

    let n = state.token_exchanges.fetch_add(1, Ordering::SeqCst) + 1;
    let mut body = json!({"access_token": format!("tok-{n}"), "token_type": "Bearer"});
    if state.omit_token_expiry.load(Ordering::SeqCst) == 0 {
        body["expires_in"] = json!(3600);
    }

    (StatusCode::OK, body.to_string()).into_response()
}

async fn query_handler(
    State(state): State<Arc<MockCrmState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.query_requests.fetch_add(1, Ordering::SeqCst);

    if let Some(response) = state.gate(&headers).await {
        return response;
    }

    let delay = state.query_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    *state.last_query.lock().await = params.get("q").cloned();

    let records = state.records.lock().await.clone();
    let body = json!({
        "totalSize": records.len(),
        "done": true,
        "records": records
    });

    (StatusCode::OK, body.to_string()).into_response()
}

async fn command_handler(
    State(state): State<Arc<MockCrmState>>,
    Path(command): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.command_requests.fetch_add(1, Ordering::SeqCst);

    if let Some(response) = state.gate(&headers).await {
        return response;
    }

    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    *state.last_command.lock().await = Some((command, payload));

    match state.command_echo.lock().await.clone() {
        Some(echo) => (StatusCode::OK, echo.to_string()).into_response(),
        None => (StatusCode::OK, String::new()).into_response(),
    }
}

/// A running mock CRM.
pub struct MockCrm {
    /// Scripting and observation handle.
    pub state: Arc<MockCrmState>,
    /// Base URL the client should be pointed at.
    pub base_url: String,
}

impl MockCrm {
    /// Start the mock CRM on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind; tests cannot proceed without it.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(MockCrmState::default());

        let app = Router::new()
            .route("/services/oauth2/token", post(token_handler))
            .route("/services/data/{version}/query", get(query_handler))
            .route("/services/apexrest/{command}", post(command_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock CRM listener");
        let addr = listener.local_addr().expect("listener has no local addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    /// Client configuration pointing at this mock.
    #[must_use]
    pub fn config(&self) -> CrmConfig {
        CrmConfig {
            base_url: self.base_url.clone(),
            api_version: "v61.0".to_string(),
            client_id: "test-connected-app".to_string(),
            client_secret: SecretString::from("kQ7#vN2$mX9@pL4&wR8^zT1*uH6!aB3c"),
            fallback_token_ttl_secs: 1800,
            http_timeout_secs: 5,
        }
    }

    /// Seed the query endpoint with records.
    pub async fn seed_records(&self, records: Vec<Value>) {
        *self.state.records.lock().await = records;
    }
}
