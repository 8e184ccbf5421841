//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Labsieve: curation and provenance for lab training data
#[derive(Parser)]
#[command(name = "labsieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ./labsieve.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect source artifacts into the raw dataset
    Collect {
        /// Source directories to walk (replaces the configured list)
        #[arg(short, long, value_name = "DIR", num_args = 1..)]
        sources: Vec<PathBuf>,

        /// Raw dataset output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append new content to an existing raw dataset
        #[arg(long)]
        append: bool,
    },

    /// Redact and classify the raw dataset into curated and review outputs
    Curate {
        /// Raw dataset input path
        #[arg(long, value_name = "FILE")]
        raw: Option<PathBuf>,

        /// Curated dataset output path
        #[arg(long, value_name = "FILE")]
        curated: Option<PathBuf>,

        /// Human review queue output path
        #[arg(long, value_name = "FILE")]
        review: Option<PathBuf>,
    },

    /// Write a provenance manifest for the dataset and model iterations
    Manifest {
        /// Directory holding iteration_NNN subdirectories
        #[arg(long, value_name = "DIR")]
        models_dir: Option<PathBuf>,

        /// Curated dataset to hash
        #[arg(long, value_name = "FILE")]
        dataset: Option<PathBuf>,

        /// Output directory for manifests
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Detach-sign the manifest with gpg
        #[arg(long)]
        sign: bool,

        /// Key id to sign with (implies --sign)
        #[arg(long, value_name = "ID")]
        gpg_key: Option<String>,
    },

    /// Check a manifest against the files it describes
    Verify {
        /// Manifest to verify (default: newest in the manifest directory)
        #[arg(value_name = "MANIFEST")]
        manifest: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect, then curate
    Run,
}
