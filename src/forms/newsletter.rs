//! Newsletter signup handling.

use chrono::Utc;
use uuid::Uuid;

use crate::forms::error::FormError;
use crate::forms::locale::Locale;
use crate::forms::sanitize::sanitize_email;
use crate::forms::types::{present, NewsletterRequest, NewsletterSignup, Submission};
use crate::forms::validate::{is_disposable_email, is_valid_email};
use crate::forms::{deliver, enforce_rate_limit, FormContext};

pub const FORM: &str = "newsletter";

/// Validate, rate limit and deliver a newsletter signup.
pub async fn submit_newsletter(
    ctx: &FormContext<'_>,
    request: NewsletterRequest,
    locale: Locale,
) -> Result<String, FormError> {
    let Some(raw_email) = present(&request.email) else {
        return Err(FormError::MissingFields(vec!["email"]));
    };

    let email = sanitize_email(raw_email).to_lowercase();
    if !is_valid_email(&email) {
        return Err(FormError::InvalidEmail);
    }

    enforce_rate_limit(ctx, FORM)?;

    if is_disposable_email(&email, &ctx.settings.disposable_domains) {
        tracing::info!(client = %ctx.client, "Rejected disposable email domain");
        return Err(FormError::DisposableEmail);
    }

    let submission = Submission::Newsletter(NewsletterSignup {
        id: Uuid::new_v4(),
        received_at: Utc::now(),
        client: ctx.client.to_string(),
        locale,
        email,
    });

    deliver(ctx, &submission).await?;

    Ok(locale
        .pick(
            "Erfolgreich angemeldet! Willkommen bei Projekt Susi.",
            "Successfully subscribed! Welcome to Projekt Susi.",
        )
        .to_string())
}
