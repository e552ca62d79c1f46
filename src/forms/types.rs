//! Request, submission and response types for the form endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::locale::Locale;

/// Body of `POST /api/contact`, exactly as the caller sent it.
///
/// Every field is optional here; presence is checked by the handler.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub message: Option<String>,
    pub interest: Option<String>,
    pub locale: Option<String>,
}

/// Body of `POST /api/newsletter`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsletterRequest {
    pub email: Option<String>,
    pub locale: Option<String>,
}

/// A sanitized, validated contact inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub client: String,
    pub locale: Locale,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub industry: String,
    pub message: String,
    pub interest: String,
}

/// A sanitized, validated newsletter signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsletterSignup {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub client: String,
    pub locale: Locale,
    pub email: String,
}

/// An accepted submission handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Submission {
    Contact(ContactSubmission),
    Newsletter(NewsletterSignup),
}

impl Submission {
    pub fn id(&self) -> Uuid {
        match self {
            Submission::Contact(s) => s.id,
            Submission::Newsletter(s) => s.id,
        }
    }

    pub fn form(&self) -> &'static str {
        match self {
            Submission::Contact(_) => "contact",
            Submission::Newsletter(_) => "newsletter",
        }
    }
}

/// JSON body of every form response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(code.to_string()),
        }
    }
}

/// Treat absent and empty strings alike.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
