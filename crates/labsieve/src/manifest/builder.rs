//! Manifest builder: dataset hash + model iteration fingerprints.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::ManifestConfig;
use crate::digest::{dir_fingerprint, sha256_file};
use crate::error::{Result, SieveError};

use super::descriptor::{DatasetDescriptor, ManifestDescriptor, ModelEntry};

/// Prefix of model iteration directory names (`iteration_001`).
pub const ITERATION_PREFIX: &str = "iteration_";

/// Per-iteration manifest written by the training process.
pub const ITERATION_MANIFEST: &str = "manifest.json";

/// Keys owned by the builder; a per-iteration manifest cannot override them.
const RESERVED_KEYS: &[&str] = &["path", "iteration", "dir_hash"];

/// Upper bound on same-second filename collisions.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// A manifest that has been written to disk.
#[derive(Debug, Clone)]
pub struct BuiltManifest {
    pub path: PathBuf,
    pub descriptor: ManifestDescriptor,
}

/// Assembles and writes provenance manifests.
pub struct ManifestBuilder<'a> {
    config: &'a ManifestConfig,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(config: &'a ManifestConfig) -> Self {
        Self { config }
    }

    /// Build from the configured models directory and dataset.
    pub fn build(&self) -> Result<BuiltManifest> {
        self.build_from(&self.config.models_dir, &self.config.dataset)
    }

    /// Build a manifest for `models_dir` and `dataset` and write it as a new
    /// timestamped file in the configured output directory.
    pub fn build_from(&self, models_dir: &Path, dataset: &Path) -> Result<BuiltManifest> {
        let descriptor = self.assemble(models_dir, dataset, Utc::now())?;
        let path = self.write(&descriptor)?;

        tracing::info!(
            models = descriptor.models.len(),
            dataset = descriptor.dataset.is_some(),
            "Wrote manifest {}",
            path.display()
        );

        Ok(BuiltManifest { path, descriptor })
    }

    /// Compute the manifest document without writing it.
    pub fn assemble(
        &self,
        models_dir: &Path,
        dataset: &Path,
        generated_at: DateTime<Utc>,
    ) -> Result<ManifestDescriptor> {
        let has_dataset = dataset.is_file();
        let has_models = models_dir.is_dir();

        if !has_dataset && !has_models {
            return Err(SieveError::missing(
                dataset,
                format!(
                    "no curated dataset and no models directory '{}'; run `labsieve curate` and a training iteration first",
                    models_dir.display()
                ),
            ));
        }

        let dataset = if has_dataset {
            Some(DatasetDescriptor {
                path: dataset.to_string_lossy().into_owned(),
                sha256: sha256_file(dataset)?,
            })
        } else {
            tracing::warn!(dataset = %dataset.display(), "Dataset not found, recording none");
            None
        };

        let models = if has_models {
            iteration_dirs(models_dir)?
                .into_iter()
                .map(|(iteration, dir)| model_entry(iteration, &dir))
                .collect()
        } else {
            tracing::warn!(models_dir = %models_dir.display(), "Models directory not found");
            Vec::new()
        };

        Ok(ManifestDescriptor {
            generated_at,
            dataset,
            models,
        })
    }

    /// Write `descriptor` to a fresh `manifest_<timestamp>.json`.
    ///
    /// Existing manifests are never overwritten: a name that is already
    /// taken gets a numeric suffix.
    pub fn write(&self, descriptor: &ManifestDescriptor) -> Result<PathBuf> {
        let out_dir = &self.config.output_dir;
        fs::create_dir_all(out_dir).map_err(|e| SieveError::io(out_dir, e))?;

        let stamp = descriptor.generated_at.format("%Y%m%dT%H%M%SZ").to_string();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("manifest_{}.json", stamp)
            } else {
                format!("manifest_{}_{}.json", stamp, attempt)
            };
            let path = out_dir.join(name);

            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(SieveError::io(&path, e)),
            };

            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, descriptor)?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|e| SieveError::io(&path, e))?;
            return Ok(path);
        }

        Err(SieveError::Config(format!(
            "too many manifests for timestamp {} in '{}'",
            stamp,
            out_dir.display()
        )))
    }
}

/// Manifests in `dir`, newest first.
///
/// Names embed the UTC generation time, so reverse name order is
/// chronological. Signature files are not listed.
pub fn list_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut manifests: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| SieveError::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("manifest_") && n.ends_with(".json"))
        })
        .collect();

    manifests.sort_by(|a, b| manifest_sort_key(b).cmp(&manifest_sort_key(a)));
    Ok(manifests)
}

/// `(timestamp, collision suffix)` from a manifest file name.
fn manifest_sort_key(path: &Path) -> (String, u64) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.trim_start_matches("manifest_");
    match stem.split_once('_') {
        Some((stamp, n)) => (stamp.to_string(), n.parse().unwrap_or(0)),
        None => (stem.to_string(), 0),
    }
}

/// Iteration number encoded in a directory name, e.g. `iteration_003` → 3.
pub fn parse_iteration(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(ITERATION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Iteration subdirectories of `models_dir`, ascending by number.
pub fn iteration_dirs(models_dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let entries = fs::read_dir(models_dir).map_err(|e| SieveError::io(models_dir, e))?;

    let mut dirs: Vec<(u64, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let iteration = parse_iteration(&entry.file_name().to_string_lossy())?;
            Some((iteration, entry.path()))
        })
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// Entry for one iteration directory.
///
/// A missing or unreadable per-iteration manifest leaves the entry sparse;
/// it never fails the build.
fn model_entry(iteration: u64, dir: &Path) -> ModelEntry {
    let mut entry = ModelEntry::new(dir.to_string_lossy(), iteration);

    if let Some(fields) = read_iteration_manifest(dir) {
        if let Some(recorded) = fields.get("iteration") {
            if recorded.as_u64() != Some(iteration) {
                tracing::warn!(
                    dir = %dir.display(),
                    recorded = %recorded,
                    "Iteration manifest disagrees with directory name"
                );
            }
        }
        for (key, value) in fields {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                entry.fields.insert(key, value);
            }
        }
    }

    match dir_fingerprint(dir) {
        Ok(hash) => entry.dir_hash = Some(hash),
        Err(e) => tracing::warn!(dir = %dir.display(), "Could not fingerprint directory: {}", e),
    }

    entry
}

fn read_iteration_manifest(dir: &Path) -> Option<serde_json::Map<String, Value>> {
    let path = dir.join(ITERATION_MANIFEST);
    if !path.is_file() {
        return None;
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<Value>(&s).map_err(|e| e.to_string()));

    match parsed {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Iteration manifest is not a JSON object, ignoring");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Could not read iteration manifest: {}", e);
            None
        }
    }
}
