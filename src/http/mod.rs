//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handlers)
//!     → request.rs (request ID)
//!     → forms subsystem (validate, limit, deliver)
//!     → boundary.rs (failure hook + fallback rendering)
//!     → response.rs (status, JSON body, Allow / Retry-After)
//!     → Send to client
//! ```

pub mod boundary;
pub mod request;
pub mod response;
pub mod server;

pub use boundary::ErrorBoundary;
pub use request::X_REQUEST_ID;
pub use server::{with_middleware, AppState, HttpServer};
