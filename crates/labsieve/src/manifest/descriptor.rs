//! Manifest document types.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provenance document binding a dataset snapshot to model iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    pub generated_at: DateTime<Utc>,
    /// `None` when no dataset file existed at build time.
    pub dataset: Option<DatasetDescriptor>,
    /// Iterations in ascending order.
    pub models: Vec<ModelEntry>,
}

/// Hash of the full dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub path: String,
    pub sha256: String,
}

/// One model iteration directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub path: String,
    #[serde(default)]
    pub iteration: Option<u64>,
    /// Fields merged from the iteration's own `manifest.json`, in file order.
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
    /// Path-and-size fingerprint of the directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_hash: Option<String>,
}

impl ModelEntry {
    pub fn new(path: impl Into<String>, iteration: u64) -> Self {
        Self {
            path: path.into(),
            iteration: Some(iteration),
            fields: IndexMap::new(),
            dir_hash: None,
        }
    }

    /// Dataset reference recorded by the training run, if any.
    pub fn dataset(&self) -> Option<&str> {
        self.fields.get("dataset").and_then(Value::as_str)
    }

    /// Dataset hash recorded by the training run, if any.
    pub fn dataset_sha256(&self) -> Option<&str> {
        self.fields.get("dataset_sha256").and_then(Value::as_str)
    }
}
