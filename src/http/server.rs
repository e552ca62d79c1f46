//! HTTP server setup and form handlers.
//!
//! # Responsibilities
//! - Create Axum Router with the form and health handlers
//! - Wire up middleware (request ID, tracing, timeout, panic capture)
//! - Resolve client address, locale and body for each submission
//! - Apply hot-reloaded configuration
//! - Serve until the shutdown signal fires

use arc_swap::ArcSwap;
use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FormsConfig;
use crate::forms::{
    self, contact, newsletter, ContactRequest, FormContext, FormError, Locale, LogSink,
    NewsletterRequest, SubmissionSink,
};
use crate::http::boundary::ErrorBoundary;
use crate::http::request::{
    request_id, MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer, X_REQUEST_ID,
};
use crate::http::response::{error_response, success_response};
use crate::observability::metrics;
use crate::security::{rate_limit::run_sweeper, resolve_client_addr, FixedWindowLimiter, RateLimitPolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<FormsConfig>>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub sink: Arc<dyn SubmissionSink>,
}

impl AppState {
    pub fn new(
        config: FormsConfig,
        limiter: Arc<FixedWindowLimiter>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            limiter,
            sink,
        }
    }

    /// Swap in a new configuration; the next request sees it.
    pub fn apply_config(&self, config: FormsConfig) {
        tracing::info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window_secs,
            "Configuration reloaded"
        );
        self.config.store(Arc::new(config));
    }
}

/// HTTP server for the form endpoints.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server with the in-memory limiter and the logging sink.
    pub fn new(config: FormsConfig) -> Self {
        let state = AppState::new(
            config,
            Arc::new(FixedWindowLimiter::in_memory()),
            Arc::new(LogSink),
        );
        Self::with_state(state)
    }

    pub fn with_state(state: AppState) -> Self {
        let config = state.config.load_full();
        let router = with_middleware(routes(state.clone()), &config);
        Self { router, state }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<FormsConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(config);
            }
        });

        let sweep_secs = self.state.config.load().rate_limit.sweep_interval_secs;
        if sweep_secs > 0 {
            tokio::spawn(run_sweeper(
                self.state.limiter.clone(),
                Duration::from_secs(sweep_secs),
                shutdown.resubscribe(),
            ));
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", any(contact_handler))
        .route("/api/newsletter", any(newsletter_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Wrap a router in the request-id, tracing, timeout and panic layers.
#[allow(deprecated)]
pub fn with_middleware(router: Router, config: &FormsConfig) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request.headers()),
            )
        }))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    error_response(&FormError::Internal(detail.to_string()), Locale::default())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn contact_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle_form(state, request, contact::FORM).await
}

async fn newsletter_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle_form(state, request, newsletter::FORM).await
}

async fn handle_form(state: AppState, request: Request<Body>, form: &'static str) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let config = state.config.load_full();
    let default_locale = Locale::parse(&config.forms.default_locale).unwrap_or_default();

    let (locale, result) = process(&state, &config, request, form, default_locale).await;

    let boundary = ErrorBoundary::new(|err: &FormError| report_failure(form, &request_id, err));
    let response = boundary.render(result.map(success_response), |err| {
        error_response(&err, locale)
    });

    metrics::record_request(form, response.status().as_u16(), start);
    response
}

async fn process(
    state: &AppState,
    config: &FormsConfig,
    request: Request<Body>,
    form: &'static str,
    default_locale: Locale,
) -> (Locale, Result<String, FormError>) {
    if request.method() != Method::POST {
        return (default_locale, Err(FormError::MethodNotAllowed));
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = resolve_client_addr(request.headers(), peer);

    let body = match to_bytes(request.into_body(), config.security.max_body_size).await {
        Ok(body) => body,
        Err(e) => return (default_locale, Err(FormError::InvalidBody(e.to_string()))),
    };

    let ctx = FormContext {
        settings: &config.forms,
        policy: RateLimitPolicy::from(&config.rate_limit),
        limiter: &state.limiter,
        sink: state.sink.as_ref(),
        client: &client,
    };

    if form == contact::FORM {
        match serde_json::from_slice::<ContactRequest>(&body) {
            Ok(request) => {
                let locale = Locale::resolve(request.locale.as_deref(), default_locale);
                (locale, forms::submit_contact(&ctx, request, locale).await)
            }
            Err(e) => (default_locale, Err(FormError::InvalidBody(e.to_string()))),
        }
    } else {
        match serde_json::from_slice::<NewsletterRequest>(&body) {
            Ok(request) => {
                let locale = Locale::resolve(request.locale.as_deref(), default_locale);
                (locale, forms::submit_newsletter(&ctx, request, locale).await)
            }
            Err(e) => (default_locale, Err(FormError::InvalidBody(e.to_string()))),
        }
    }
}

fn report_failure(form: &'static str, request_id: &str, err: &FormError) {
    metrics::record_error(form, err.code());
    if err.is_internal() {
        tracing::error!(request_id = %request_id, form, error = %err, "Form submission failed");
    } else {
        tracing::debug!(request_id = %request_id, form, code = err.code(), error = %err, "Form submission rejected");
    }
}
