//! Projekt Susi site backend: rate-limited form endpoints and CMS content checks.

pub mod config;
pub mod content;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::FormsConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
