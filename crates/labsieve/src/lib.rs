//! Labsieve: curation and provenance for lab-generated training data.
//!
//! Labsieve turns the text artifacts a security lab produces (sensor logs,
//! reports, chat history) into a training dataset that is safe to use, and
//! records exactly which dataset each model iteration was trained on.
//!
//! # Core Principles
//!
//! - **Content-addressed**: a record's id is the SHA-256 of its text, so the
//!   same content is collected once
//! - **Quarantine over deletion**: sensitive records go to a human review
//!   queue, never to the curated dataset
//! - **Full provenance**: manifests bind dataset bytes to model iterations and
//!   can be detach-signed and re-verified later
//!
//! # Example
//!
//! ```no_run
//! use labsieve::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let run = pipeline.run().unwrap();
//! println!("Curated: {}", run.curate.counts.curated);
//! println!("Reviewed: {}", run.curate.counts.reviewed);
//!
//! let manifest = pipeline.build_manifest().unwrap();
//! println!("Manifest: {}", manifest.manifest.path.display());
//! ```

pub mod collector;
pub mod config;
pub mod curator;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod ndjson;
pub mod record;
pub mod rules;

mod pipeline;

pub use crate::pipeline::{ManifestOutcome, Pipeline, RunReport};
pub use collector::{CollectReport, Collector};
pub use config::{CollectorConfig, CuratorConfig, ManifestConfig, PipelineConfig};
pub use curator::{CurationCounts, CurationReport, Curator, Disposition};
pub use error::{Result, SieveError};
pub use manifest::{
    ManifestBuilder, ManifestDescriptor, ModelEntry, Signer, SigningOutcome, VerifyReport,
};
pub use record::{CuratedRecord, RawRecord, RecordMeta, ReviewRecord};
pub use rules::{RedactionTable, SensitivityCategory, SensitivityTable};
