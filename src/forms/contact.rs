//! Contact inquiry handling.

use chrono::Utc;
use uuid::Uuid;

use crate::forms::error::FormError;
use crate::forms::locale::Locale;
use crate::forms::sanitize::{sanitize_email, sanitize_text};
use crate::forms::types::{present, ContactRequest, ContactSubmission, Submission};
use crate::forms::validate::{is_valid_email, is_valid_phone};
use crate::forms::{deliver, enforce_rate_limit, FormContext};

pub const FORM: &str = "contact";

/// Validate, rate limit and deliver a contact inquiry.
///
/// Returns the localized confirmation on success.
pub async fn submit_contact(
    ctx: &FormContext<'_>,
    request: ContactRequest,
    locale: Locale,
) -> Result<String, FormError> {
    let missing: Vec<&'static str> = [
        ("name", &request.name),
        ("company", &request.company),
        ("email", &request.email),
        ("industry", &request.industry),
        ("message", &request.message),
    ]
    .into_iter()
    .filter(|(_, value)| present(value).is_none())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(FormError::MissingFields(missing));
    }

    let text = |field: &Option<String>| sanitize_text(field.as_deref().unwrap_or_default());
    let email = sanitize_email(request.email.as_deref().unwrap_or_default());
    let phone = present(&request.phone).map(sanitize_text);

    if !is_valid_email(&email) {
        return Err(FormError::InvalidEmail);
    }

    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            return Err(FormError::InvalidPhone);
        }
    }

    enforce_rate_limit(ctx, FORM)?;

    let submission = Submission::Contact(ContactSubmission {
        id: Uuid::new_v4(),
        received_at: Utc::now(),
        client: ctx.client.to_string(),
        locale,
        name: text(&request.name),
        company: text(&request.company),
        email,
        phone: phone.filter(|p| !p.is_empty()),
        industry: text(&request.industry),
        message: text(&request.message),
        interest: text(&request.interest),
    });

    deliver(ctx, &submission).await?;

    Ok(locale
        .pick(
            "Vielen Dank für Ihre Anfrage! Wir melden uns innerhalb von 24 Stunden bei Ihnen.",
            "Thank you for your inquiry! We will get back to you within 24 hours.",
        )
        .to_string())
}
