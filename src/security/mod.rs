//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Validated submission:
//!     → client_addr.rs (who is asking: forwarding headers, peer, "unknown")
//!     → rate_limit.rs (fixed-window count per form and address)
//!     → Pass to sink
//! ```
//!
//! # Design Decisions
//! - Limiter runs after validation so malformed requests never consume quota
//! - Store and clock are injected; the default store is process-local
//! - Forwarding headers are trusted as-is (deploy behind a proxy that sets them)

pub mod client_addr;
pub mod rate_limit;

pub use client_addr::resolve_client_addr;
pub use rate_limit::{
    Clock, FixedWindowLimiter, InMemoryStore, ManualClock, RateDecision, RateLimitPolicy,
    RateLimitStore, SystemClock, WindowCount,
};
