//! Mapping form outcomes to HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::forms::{FormError, FormResponse, Locale};

pub fn success_response(message: String) -> Response {
    (StatusCode::OK, Json(FormResponse::ok(message))).into_response()
}

/// JSON failure body plus `Allow` / `Retry-After` where the status calls for it.
pub fn error_response(err: &FormError, locale: Locale) -> Response {
    let body = FormResponse::failure(err.message(locale), err.code());
    let mut response = (err.status(), Json(body)).into_response();

    match err {
        FormError::MethodNotAllowed => {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        FormError::RateLimited { retry_after_secs } => {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        _ => {}
    }

    response
}
