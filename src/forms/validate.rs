//! Format checks for email and phone fields.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{8,}$").expect("phone pattern is valid"));

/// `local@domain.tld` shape, no whitespace, at least one dot after the `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Digits, spaces, parentheses and hyphens with an optional leading `+`.
/// The field is optional, so an empty value passes.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || PHONE_RE.is_match(phone)
}

/// Domain part of an email address, lowercased.
pub fn email_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
}

/// Exact-match lookup of the email's domain in `deny_list`.
pub fn is_disposable_email(email: &str, deny_list: &[String]) -> bool {
    match email_domain(email) {
        Some(domain) => deny_list.iter().any(|d| d.eq_ignore_ascii_case(&domain)),
        None => false,
    }
}
