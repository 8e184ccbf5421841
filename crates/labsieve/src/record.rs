//! Record types flowing between pipeline stages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::sha256_text;

/// Flag written on every review queue record.
pub const SENSITIVE_FLAG: &str = "sensitive";

/// One collected artifact, as written to the raw dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Path the text was read from.
    pub source: String,
    /// When the artifact was collected.
    pub collected_at: DateTime<Utc>,
    /// Stored text (possibly truncated).
    pub text: String,
    /// SHA-256 of `text`; identity and dedup key.
    pub id: String,
}

impl RawRecord {
    /// Build a record, deriving its id from the stored text.
    pub fn new(source: impl Into<String>, text: String, collected_at: DateTime<Utc>) -> Self {
        let id = sha256_text(&text);
        Self {
            source: source.into(),
            collected_at,
            text,
            id,
        }
    }
}

/// Raw dataset line as read back by the curator.
///
/// Every field is optional so that raw files written by older tooling or by
/// hand still curate; only the JSON shape itself must be an object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLine {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub collected_at: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Short metadata carried into curated and review output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: String,
    pub source: Option<String>,
    pub collected_at: String,
}

impl RecordMeta {
    /// Metadata for a raw line whose text is `text`.
    ///
    /// A missing id is recomputed from the text and a missing timestamp
    /// defaults to `now`.
    pub fn from_raw(line: &RawLine, text: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: line.id.clone().unwrap_or_else(|| sha256_text(text)),
            source: line.source.clone(),
            collected_at: line
                .collected_at
                .clone()
                .unwrap_or_else(|| format_timestamp(now)),
        }
    }
}

/// A training-safe record with redacted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedRecord {
    pub meta: RecordMeta,
    pub text: String,
}

/// A quarantined record awaiting human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub meta: RecordMeta,
    /// Unredacted leading excerpt.
    pub raw_excerpt: String,
    /// Always [`SENSITIVE_FLAG`].
    pub flag: String,
    /// Redacted form of `raw_excerpt`.
    pub curated_excerpt: String,
    /// Name of the sensitivity rule that fired.
    pub rule: String,
}

/// UTC timestamp in ISO-8601 with a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Leading `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
