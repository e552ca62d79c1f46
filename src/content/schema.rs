//! CMS content types and their validation rules.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

use crate::forms::Locale;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

pub const MAX_SLUG_CHARS: usize = 96;
pub const MAX_TITLE_CHARS: usize = 120;
pub const MAX_SEO_DESCRIPTION_CHARS: usize = 160;
pub const MAX_EXCERPT_CHARS: usize = 300;
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Type-specific part of an entry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBody {
    Page {
        sections: Vec<Section>,
    },
    BlogPost {
        excerpt: String,
        body: String,
        author: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    CaseStudy {
        client: String,
        industry: String,
        challenge: String,
        solution: String,
        results: Vec<String>,
    },
}

impl ContentBody {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBody::Page { .. } => "page",
            ContentBody::BlogPost { .. } => "blog_post",
            ContentBody::CaseStudy { .. } => "case_study",
        }
    }
}

/// One CMS entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub slug: String,
    pub locale: Locale,
    pub title: String,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seo: Seo,
    #[serde(flatten)]
    pub body: ContentBody,
}

/// A rule an entry breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("slug '{0}' must be lowercase words joined by single hyphens")]
    InvalidSlug(String),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("published entries need published_at")]
    MissingPublishDate,

    #[error("at most 10 tags are allowed, got {0}")]
    TooManyTags(usize),
}

fn check_len(
    violations: &mut Vec<SchemaViolation>,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.chars().count() > max {
        violations.push(SchemaViolation::TooLong { field, max });
    }
}

fn check_non_empty(violations: &mut Vec<SchemaViolation>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        violations.push(SchemaViolation::Empty(field));
    }
}

/// Check every rule and report all violations.
pub fn validate_entry(entry: &ContentEntry) -> Result<(), Vec<SchemaViolation>> {
    let mut violations = Vec::new();

    if !SLUG_RE.is_match(&entry.slug) {
        violations.push(SchemaViolation::InvalidSlug(entry.slug.clone()));
    }
    check_len(&mut violations, "slug", &entry.slug, MAX_SLUG_CHARS);

    check_non_empty(&mut violations, "title", &entry.title);
    check_len(&mut violations, "title", &entry.title, MAX_TITLE_CHARS);

    if entry.status == PublishStatus::Published && entry.published_at.is_none() {
        violations.push(SchemaViolation::MissingPublishDate);
    }

    check_len(
        &mut violations,
        "seo.description",
        &entry.seo.description,
        MAX_SEO_DESCRIPTION_CHARS,
    );

    match &entry.body {
        ContentBody::Page { sections } => {
            if sections.is_empty() {
                violations.push(SchemaViolation::Empty("sections"));
            }
        }
        ContentBody::BlogPost {
            excerpt,
            body,
            author,
            tags,
        } => {
            check_len(&mut violations, "excerpt", excerpt, MAX_EXCERPT_CHARS);
            check_non_empty(&mut violations, "body", body);
            check_non_empty(&mut violations, "author", author);
            if tags.len() > MAX_TAGS {
                violations.push(SchemaViolation::TooManyTags(tags.len()));
            }
        }
        ContentBody::CaseStudy {
            client, results, ..
        } => {
            check_non_empty(&mut violations, "client", client);
            if results.is_empty() {
                violations.push(SchemaViolation::Empty("results"));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
