//! Main Pipeline struct and public API.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::collector::{CollectReport, Collector};
use crate::config::PipelineConfig;
use crate::curator::{CurationReport, Curator};
use crate::error::Result;
use crate::manifest::{
    BuiltManifest, GpgSigner, ManifestBuilder, Signer, SigningOutcome, VerifyReport,
    sign_best_effort, verify_manifest,
};

/// Outcome of building (and optionally signing) a manifest.
#[derive(Debug, Clone)]
pub struct ManifestOutcome {
    pub manifest: BuiltManifest,
    /// `None` when signing was not requested.
    pub signing: Option<SigningOutcome>,
}

/// Outcome of collect followed by curate.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub collect: CollectReport,
    pub curate: CurationReport,
}

/// The pipeline stages over one configuration.
pub struct Pipeline {
    config: PipelineConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl Pipeline {
    /// Pipeline over the default lab layout.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Use `signer` instead of the configured gpg program.
    pub fn with_signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Collect source artifacts into the raw dataset.
    pub fn collect(&self) -> Result<CollectReport> {
        Collector::new(&self.config.collector).collect()
    }

    /// Split the raw dataset into curated and review outputs.
    pub fn curate(&self) -> Result<CurationReport> {
        Curator::new(&self.config.curator).curate()
    }

    /// Collect, then curate what was collected.
    pub fn run(&self) -> Result<RunReport> {
        let collect = self.collect()?;
        let curate = Curator::new(&self.config.curator).curate_file(&collect.output)?;
        Ok(RunReport { collect, curate })
    }

    /// Write a new manifest, signing it when `manifest.sign` is set.
    pub fn build_manifest(&self) -> Result<ManifestOutcome> {
        let manifest = ManifestBuilder::new(&self.config.manifest).build()?;
        let signing = self
            .config
            .manifest
            .sign
            .then(|| self.sign_manifest(&manifest.path));
        Ok(ManifestOutcome { manifest, signing })
    }

    /// Detach-sign an existing manifest. Failure leaves it unsigned.
    pub fn sign_manifest(&self, path: &Path) -> SigningOutcome {
        match &self.signer {
            Some(signer) => sign_best_effort(signer.as_ref(), path),
            None => sign_best_effort(&self.gpg_signer(), path),
        }
    }

    /// Recompute the hashes recorded in a manifest.
    pub fn verify_manifest(&self, path: &Path) -> Result<VerifyReport> {
        verify_manifest(path)
    }

    fn gpg_signer(&self) -> GpgSigner {
        let signer = GpgSigner::new().with_program(&self.config.manifest.gpg_program);
        match self.config.gpg_key() {
            Some(key) => signer.with_key(key),
            None => signer,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
