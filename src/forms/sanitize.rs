//! Input sanitization for untrusted form fields.

/// Cap for free-text fields.
pub const MAX_TEXT_CHARS: usize = 1000;

/// Cap for email fields.
pub const MAX_EMAIL_CHARS: usize = 255;

/// Strip angle brackets, trim, and cap at `max_chars` characters.
///
/// Idempotent: trailing whitespace exposed by the cap is trimmed as well.
pub fn sanitize(input: &str, max_chars: usize) -> String {
    let stripped: String = input.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let trimmed = stripped.trim();

    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Sanitize a free-text field.
pub fn sanitize_text(input: &str) -> String {
    sanitize(input, MAX_TEXT_CHARS)
}

/// Sanitize an email field.
pub fn sanitize_email(input: &str) -> String {
    sanitize(input, MAX_EMAIL_CHARS)
}
