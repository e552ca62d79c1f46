//! Form submission subsystem.
//!
//! # Data Flow
//! ```text
//! JSON body (untrusted)
//!     → contact.rs / newsletter.rs (required fields)
//!     → sanitize.rs (strip, trim, cap)
//!     → validate.rs (email, phone, disposable domains)
//!     → security::rate_limit (fixed window per form and client)
//!     → sink.rs (side effect)
//!     → localized confirmation (locale.rs)
//! ```
//!
//! # Design Decisions
//! - First failure short-circuits; nothing is retried
//! - Every failure is a `FormError` carrying status, code and message
//! - The side effect sits behind a trait; only logging ships

pub mod contact;
pub mod error;
pub mod locale;
pub mod newsletter;
pub mod sanitize;
pub mod sink;
pub mod types;
pub mod validate;

use std::time::Duration;

pub use contact::submit_contact;
pub use error::FormError;
pub use locale::Locale;
pub use newsletter::submit_newsletter;
pub use sink::{LogSink, SinkError, SubmissionSink};
pub use types::{ContactRequest, FormResponse, NewsletterRequest, Submission};

use crate::config::FormSettings;
use crate::observability::metrics;
use crate::security::{FixedWindowLimiter, RateDecision, RateLimitPolicy};

/// Everything a submission needs besides its body.
pub struct FormContext<'a> {
    pub settings: &'a FormSettings,
    pub policy: RateLimitPolicy,
    pub limiter: &'a FixedWindowLimiter,
    pub sink: &'a dyn SubmissionSink,
    /// Resolved client address.
    pub client: &'a str,
}

pub(crate) fn enforce_rate_limit(ctx: &FormContext<'_>, form: &'static str) -> Result<(), FormError> {
    let key = format!("{form}:{}", ctx.client);
    match ctx.limiter.check(&key, &ctx.policy) {
        RateDecision::Allowed { .. } => Ok(()),
        RateDecision::Limited { retry_after_ms } => {
            metrics::record_rate_limited(form);
            Err(FormError::RateLimited {
                retry_after_secs: retry_after_ms.div_ceil(1000).max(1),
            })
        }
    }
}

pub(crate) async fn deliver(ctx: &FormContext<'_>, submission: &Submission) -> Result<(), FormError> {
    if ctx.settings.processing_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(ctx.settings.processing_delay_ms)).await;
    }

    ctx.sink.deliver(submission)?;
    metrics::record_submission(submission.form());
    Ok(())
}
