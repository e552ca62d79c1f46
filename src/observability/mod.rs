//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and limiter produce:
//!     → logging.rs (structured log events, request spans via TraceLayer)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every response and log span
//! - Metrics are cheap and optional (no recorder, no cost)

pub mod logging;
pub mod metrics;
