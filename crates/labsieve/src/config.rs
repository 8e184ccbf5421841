//! Pipeline configuration.
//!
//! Every stage reads its paths and limits from a [`PipelineConfig`] that is
//! built once (defaults, optionally overlaid by a TOML file and CLI flags) and
//! then passed by reference.
//!
//! # Example
//!
//! ```
//! use labsieve::PipelineConfig;
//!
//! let config: PipelineConfig = toml::from_str(r#"
//!     [collector]
//!     sources = ["lab/reports"]
//!
//!     [manifest]
//!     sign = true
//! "#).unwrap();
//!
//! assert_eq!(config.collector.sources.len(), 1);
//! assert_eq!(config.curator.curated.to_string_lossy(), "unsupervised/curated.jsonl");
//! assert!(config.manifest.sign);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};

/// Texts longer than this many characters are truncated.
pub const DEFAULT_MAX_CHARS: usize = 2_000_000;

/// Number of characters kept from an oversized text.
pub const DEFAULT_TRUNCATE_TO: usize = 20_000;

/// Number of characters kept in review queue excerpts.
pub const DEFAULT_EXCERPT_CHARS: usize = 2_000;

/// Top-level configuration for all pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub collector: CollectorConfig,
    pub curator: CuratorConfig,
    pub manifest: ManifestConfig,
}

/// Collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Source directories, walked recursively.
    pub sources: Vec<PathBuf>,
    /// Raw dataset output (NDJSON).
    pub output: PathBuf,
    /// Append to an existing raw dataset instead of rewriting it.
    pub append: bool,
    /// Texts above this many characters are truncated.
    pub max_chars: usize,
    /// Characters kept from a truncated text.
    pub truncate_to: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                PathBuf::from("zeek/logs"),
                PathBuf::from("suricata/log"),
                PathBuf::from("lab/reports"),
                PathBuf::from("ai/history"),
                PathBuf::from("mock_llm/logs"),
            ],
            output: PathBuf::from("unsupervised/dataset_raw.jsonl"),
            append: false,
            max_chars: DEFAULT_MAX_CHARS,
            truncate_to: DEFAULT_TRUNCATE_TO,
        }
    }
}

/// Curator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Raw dataset input (NDJSON written by the collector).
    pub raw: PathBuf,
    /// Curated dataset output.
    pub curated: PathBuf,
    /// Human review queue output.
    pub review: PathBuf,
    /// Characters kept in review excerpts.
    pub excerpt_chars: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("unsupervised/dataset_raw.jsonl"),
            curated: PathBuf::from("unsupervised/curated.jsonl"),
            review: PathBuf::from("unsupervised/human_review.jsonl"),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

/// Manifest builder and signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Directory holding `iteration_NNN` subdirectories.
    pub models_dir: PathBuf,
    /// Curated dataset to hash.
    pub dataset: PathBuf,
    /// Where manifests are written.
    pub output_dir: PathBuf,
    /// Detach-sign each manifest after writing it.
    pub sign: bool,
    /// Signing key id (empty = signer default key).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpg_key: Option<String>,
    /// Program used for detached signatures.
    pub gpg_program: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            dataset: PathBuf::from("unsupervised/curated.jsonl"),
            output_dir: PathBuf::from("unsupervised/manifests"),
            sign: false,
            gpg_key: None,
            gpg_program: PathBuf::from("gpg"),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SieveError::io(path, e))?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check limits that would make a stage misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.collector.truncate_to == 0 {
            return Err(SieveError::Config(
                "collector.truncate_to must be greater than zero".into(),
            ));
        }
        if self.collector.truncate_to > self.collector.max_chars {
            return Err(SieveError::Config(format!(
                "collector.truncate_to ({}) exceeds collector.max_chars ({})",
                self.collector.truncate_to, self.collector.max_chars
            )));
        }
        if self.curator.excerpt_chars == 0 {
            return Err(SieveError::Config(
                "curator.excerpt_chars must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Key id for signing, treating an empty string as "no key".
    pub fn gpg_key(&self) -> Option<&str> {
        self.manifest
            .gpg_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
