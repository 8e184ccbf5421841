//! Collector: source directories → deduplicated raw dataset.
//!
//! Every regular file under every source directory becomes at most one
//! [`RawRecord`]. Identity is the SHA-256 of the stored text, so two artifacts
//! with the same (possibly truncated) content produce a single record no
//! matter where they live.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::CollectorConfig;
use crate::digest::sha256_text;
use crate::error::Result;
use crate::ndjson::{NdjsonLine, NdjsonReader, NdjsonWriter, WriteMode};
use crate::record::{RawLine, RawRecord, truncate_chars};

/// Outcome of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    /// Raw dataset that was written.
    pub output: PathBuf,
    /// Records written by this run.
    pub collected: usize,
    /// Files whose content was already collected.
    pub duplicates: usize,
    /// Files that were empty or whitespace-only.
    pub empty: usize,
    /// Files stored truncated.
    pub truncated: usize,
    /// Files or directory entries that could not be read.
    pub unreadable: usize,
    /// Source directories that do not exist.
    pub missing_sources: usize,
}

/// Walks source directories and writes the raw dataset.
pub struct Collector<'a> {
    config: &'a CollectorConfig,
}

impl<'a> Collector<'a> {
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self { config }
    }

    /// Collect from the configured source directories.
    pub fn collect(&self) -> Result<CollectReport> {
        self.collect_from(&self.config.sources)
    }

    /// Collect from explicit source directories into the configured output.
    ///
    /// Unreadable files are skipped; only failing to write the output aborts
    /// the run.
    pub fn collect_from(&self, sources: &[PathBuf]) -> Result<CollectReport> {
        let output = &self.config.output;
        let (mode, mut seen) = if self.config.append && output.exists() {
            (WriteMode::Append, existing_ids(output)?)
        } else {
            (WriteMode::Truncate, HashSet::new())
        };

        let mut writer = NdjsonWriter::create(output, mode)?;
        let mut report = CollectReport {
            output: output.clone(),
            ..Default::default()
        };

        for base in sources {
            if !base.is_dir() {
                tracing::warn!(source = %base.display(), "Source directory not found, skipping");
                report.missing_sources += 1;
                continue;
            }

            // Symlinked files and directories are collected; loops surface as
            // walk errors and count as unreadable.
            for entry in WalkDir::new(base).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::debug!("Skipping unreadable entry: {}", e);
                        report.unreadable += 1;
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let Some(text) = read_text(entry.path()) else {
                    report.unreadable += 1;
                    continue;
                };
                if text.trim().is_empty() {
                    report.empty += 1;
                    continue;
                }

                let (stored, truncated) = self.bound(text);
                if truncated {
                    report.truncated += 1;
                }

                let record = RawRecord::new(entry.path().to_string_lossy(), stored, Utc::now());
                if !seen.insert(record.id.clone()) {
                    tracing::debug!(source = %record.source, id = %record.id, "Duplicate content");
                    report.duplicates += 1;
                    continue;
                }

                writer.write(&record)?;
            }
        }

        report.collected = writer.finish()?;

        tracing::info!(
            collected = report.collected,
            duplicates = report.duplicates,
            empty = report.empty,
            truncated = report.truncated,
            unreadable = report.unreadable,
            "Collected {} items -> {}",
            report.collected,
            report.output.display()
        );

        Ok(report)
    }

    /// Apply the size policy: oversized texts keep only a leading slice.
    fn bound(&self, text: String) -> (String, bool) {
        // Byte length bounds the char count from above.
        if text.len() <= self.config.max_chars || text.chars().count() <= self.config.max_chars {
            return (text, false);
        }
        (truncate_chars(&text, self.config.truncate_to).to_string(), true)
    }
}

/// Read a file as text, dropping byte sequences that are not valid UTF-8.
fn read_text(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(decode_lossy(&bytes)),
        Err(e) => {
            tracing::debug!(path = %path.display(), "Skipping unreadable file: {}", e);
            None
        }
    }
}

fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Ids already present in an existing raw dataset.
fn existing_ids(path: &Path) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for line in NdjsonReader::<RawLine>::open(path)? {
        match line? {
            NdjsonLine::Parsed(raw) => {
                if let Some(id) = raw.id.or_else(|| raw.text.as_deref().map(sha256_text)) {
                    ids.insert(id);
                }
            }
            NdjsonLine::Malformed { line, .. } => {
                tracing::debug!(line, "Ignoring malformed line in existing raw dataset");
            }
        }
    }
    Ok(ids)
}
