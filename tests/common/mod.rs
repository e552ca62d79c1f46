//! Shared utilities for the integration tests.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use susi_forms::config::FormsConfig;
use susi_forms::forms::{SinkError, Submission, SubmissionSink};
use susi_forms::http::{AppState, HttpServer};
use susi_forms::security::{FixedWindowLimiter, InMemoryStore, ManualClock, RateLimitStore, WindowCount};

/// Keeps every delivered submission; can be switched to fail.
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<Submission>>,
    pub fail: std::sync::atomic::AtomicBool,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl SubmissionSink for RecordingSink {
    fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable("mail relay refused connection".into()));
        }
        self.delivered.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

/// In-memory store that counts how often the limiter consulted it.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    pub calls: AtomicUsize,
}

impl RateLimitStore for CountingStore {
    fn try_acquire(
        &self,
        key: &str,
        max_requests: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> WindowCount {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.try_acquire(key, max_requests, window_ms, now_ms)
    }

    fn purge_expired(&self, now_ms: u64) -> usize {
        self.inner.purge_expired(now_ms)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub store: Arc<CountingStore>,
    pub sink: Arc<RecordingSink>,
}

impl TestApp {
    pub fn limiter_calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }
}

/// Defaults without the artificial processing delay.
pub fn test_config() -> FormsConfig {
    let mut config = FormsConfig::default();
    config.forms.processing_delay_ms = 0;
    config
}

pub fn spawn_app(config: FormsConfig) -> TestApp {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let store = Arc::new(CountingStore::default());
    let sink = Arc::new(RecordingSink::default());
    let limiter = Arc::new(FixedWindowLimiter::new(store.clone(), clock.clone()));

    let state = AppState::new(config, limiter, sink.clone());
    let server = HttpServer::with_state(state.clone());

    TestApp {
        router: server.router(),
        state,
        clock,
        store,
        sink,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

/// Send a request through the router. `client` becomes `X-Forwarded-For`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    client: Option<&str>,
    body: &str,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(client) = client {
        builder = builder.header("x-forwarded-for", client);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        json,
    }
}

pub async fn post_json(router: &Router, uri: &str, client: &str, body: Value) -> TestResponse {
    send(router, Method::POST, uri, Some(client), &body.to_string()).await
}

pub fn contact_body() -> Value {
    serde_json::json!({
        "name": "Anna Muster",
        "company": "Muster AG",
        "email": "anna@muster.ch",
        "phone": "+41 44 123 45 67",
        "industry": "Finanzen",
        "message": "Wir interessieren uns für einen KI-Workshop.",
        "interest": "workshop"
    })
}
