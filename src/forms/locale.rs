//! Response language selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the site answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    De,
    En,
}

impl Locale {
    /// Parse a language tag. Accepts "de", "en", and regional tags such as "de-CH".
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "de" => Some(Locale::De),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Resolve an optional request field, falling back to `default`.
    pub fn resolve(tag: Option<&str>, default: Locale) -> Self {
        tag.and_then(Self::parse).unwrap_or(default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    /// Pick the German or English variant of a message.
    pub fn pick(&self, de: &'static str, en: &'static str) -> &'static str {
        match self {
            Locale::De => de,
            Locale::En => en,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
