//! CMS content layer.
//!
//! Entries are JSON files (one entry per file) checked against the schema
//! in `schema.rs` before the site build picks them up.

pub mod schema;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use schema::{validate_entry, ContentBody, ContentEntry, PublishStatus, SchemaViolation};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {}", .path.display(), join(.errors))]
    Invalid {
        path: PathBuf,
        errors: Vec<SchemaViolation>,
    },

    #[error("{}: duplicate slug '{slug}' for locale '{locale}'", .path.display())]
    Duplicate {
        path: PathBuf,
        slug: String,
        locale: String,
    },
}

fn join(errors: &[SchemaViolation]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse and validate a single entry file.
pub fn load_entry(path: &Path) -> Result<ContentEntry, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entry: ContentEntry = serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_entry(&entry).map_err(|errors| ContentError::Invalid {
        path: path.to_path_buf(),
        errors,
    })?;
    Ok(entry)
}

/// Load every `*.json` entry in `dir`, in file name order.
///
/// Stops at the first invalid file. `(locale, slug)` must be unique.
pub fn load_dir(dir: &Path) -> Result<Vec<(PathBuf, ContentEntry)>, ContentError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for item in read_dir {
        let item = item.map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = item.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let entry = load_entry(&path)?;
        if !seen.insert((entry.locale, entry.slug.clone())) {
            return Err(ContentError::Duplicate {
                slug: entry.slug,
                locale: entry.locale.to_string(),
                path,
            });
        }
        tracing::debug!(path = ?path, kind = entry.body.kind(), slug = %entry.slug, "Content entry loaded");
        entries.push((path, entry));
    }

    Ok(entries)
}
