//! Form rejection taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::forms::locale::Locale;
use crate::forms::sink::SinkError;

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("disposable email domain")]
    DisposableEmail,

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl FormError {
    pub fn status(&self) -> StatusCode {
        match self {
            FormError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            FormError::InvalidBody(_)
            | FormError::MissingFields(_)
            | FormError::InvalidEmail
            | FormError::InvalidPhone
            | FormError::DisposableEmail => StatusCode::BAD_REQUEST,
            FormError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            FormError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code returned in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            FormError::MethodNotAllowed => "method_not_allowed",
            FormError::InvalidBody(_) => "invalid_body",
            FormError::MissingFields(_) => "missing_fields",
            FormError::InvalidEmail => "invalid_email",
            FormError::InvalidPhone => "invalid_phone",
            FormError::DisposableEmail => "disposable_email",
            FormError::RateLimited { .. } => "rate_limited",
            FormError::Internal(_) => "internal_error",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, FormError::Internal(_))
    }

    /// User-facing message. Internal details never leak into it.
    pub fn message(&self, locale: Locale) -> String {
        match self {
            FormError::MethodNotAllowed => {
                locale.pick("Methode nicht erlaubt.", "Method not allowed.").to_string()
            }
            FormError::InvalidBody(_) => locale
                .pick("Ungültige Anfrage.", "Invalid request body.")
                .to_string(),
            FormError::MissingFields(fields) => format!(
                "{}: {}",
                locale.pick("Pflichtfelder fehlen", "Missing required fields"),
                fields.join(", ")
            ),
            FormError::InvalidEmail => locale
                .pick(
                    "Bitte geben Sie eine gültige E-Mail-Adresse ein.",
                    "Please enter a valid email address.",
                )
                .to_string(),
            FormError::InvalidPhone => locale
                .pick(
                    "Bitte geben Sie eine gültige Telefonnummer ein.",
                    "Please enter a valid phone number.",
                )
                .to_string(),
            FormError::DisposableEmail => locale
                .pick(
                    "Wegwerf-E-Mail-Adressen sind nicht erlaubt.",
                    "Disposable email addresses are not allowed.",
                )
                .to_string(),
            FormError::RateLimited { .. } => locale
                .pick(
                    "Zu viele Anfragen. Bitte versuchen Sie es später erneut.",
                    "Too many requests. Please try again later.",
                )
                .to_string(),
            FormError::Internal(_) => locale
                .pick(
                    "Ein interner Fehler ist aufgetreten. Bitte versuchen Sie es später erneut.",
                    "An internal error occurred. Please try again later.",
                )
                .to_string(),
        }
    }
}

impl From<SinkError> for FormError {
    fn from(err: SinkError) -> Self {
        FormError::Internal(err.to_string())
    }
}
