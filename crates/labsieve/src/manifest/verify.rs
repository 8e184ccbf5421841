//! Re-check a written manifest against the files it describes.
//!
//! Paths are taken as recorded, so relative paths resolve against the
//! current directory just as they did when the manifest was built.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::digest::{dir_fingerprint, sha256_file};
use crate::error::{Result, SieveError};

use super::descriptor::ManifestDescriptor;

/// State of one recorded hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Match,
    Mismatch { actual: String },
    /// The file or directory no longer exists.
    Missing,
    /// The manifest carries no hash for this entry.
    Unrecorded,
}

impl CheckStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Match)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub path: String,
    pub expected: Option<String>,
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Result of [`verify_manifest`].
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub manifest: PathBuf,
    /// `None` when the manifest recorded no dataset.
    pub dataset: Option<Check>,
    pub models: Vec<Check>,
}

impl VerifyReport {
    /// True when every recorded hash still matches.
    pub fn is_clean(&self) -> bool {
        self.dataset.iter().chain(&self.models).all(|c| c.status.is_ok())
    }

    /// Checks that did not match.
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.dataset
            .iter()
            .chain(&self.models)
            .filter(|c| !c.status.is_ok())
    }
}

/// Load the manifest at `path` and recompute every hash it records.
pub fn verify_manifest(path: impl AsRef<Path>) -> Result<VerifyReport> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SieveError::missing(
            path,
            "no such manifest; run `labsieve manifest` first",
        ));
    }
    let text = fs::read_to_string(path).map_err(|e| SieveError::io(path, e))?;
    let descriptor: ManifestDescriptor = serde_json::from_str(&text)?;

    let dataset = descriptor.dataset.as_ref().map(|dataset| {
        let target = Path::new(&dataset.path);
        let status = if target.is_file() {
            compare(&dataset.sha256, sha256_file(target))
        } else {
            CheckStatus::Missing
        };
        Check {
            path: dataset.path.clone(),
            expected: Some(dataset.sha256.clone()),
            status,
        }
    });

    let models = descriptor
        .models
        .iter()
        .map(|entry| {
            let target = Path::new(&entry.path);
            let status = match &entry.dir_hash {
                None => CheckStatus::Unrecorded,
                Some(_) if !target.is_dir() => CheckStatus::Missing,
                Some(expected) => compare(expected, dir_fingerprint(target)),
            };
            Check {
                path: entry.path.clone(),
                expected: entry.dir_hash.clone(),
                status,
            }
        })
        .collect();

    let report = VerifyReport {
        manifest: path.to_path_buf(),
        dataset,
        models,
    };

    if report.is_clean() {
        tracing::info!(manifest = %path.display(), "Manifest verified");
    } else {
        tracing::warn!(
            manifest = %path.display(),
            failures = report.failures().count(),
            "Manifest no longer matches its inputs"
        );
    }

    Ok(report)
}

fn compare(expected: &str, actual: Result<String>) -> CheckStatus {
    match actual {
        Ok(actual) if actual == expected => CheckStatus::Match,
        Ok(actual) => CheckStatus::Mismatch { actual },
        Err(e) => {
            tracing::debug!("Could not hash: {}", e);
            CheckStatus::Missing
        }
    }
}
