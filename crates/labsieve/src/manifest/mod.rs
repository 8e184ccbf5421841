//! Provenance manifests.
//!
//! A manifest binds one snapshot of the curated dataset (by SHA-256 of its
//! bytes) to the model iteration directories present at build time (by a
//! path-and-size fingerprint). Manifests are written once and never
//! overwritten; a detached signature can be added afterwards through a
//! [`Signer`].

mod builder;
mod descriptor;
mod signer;
mod verify;

pub use builder::{
    BuiltManifest, ITERATION_MANIFEST, ITERATION_PREFIX, ManifestBuilder, iteration_dirs,
    list_manifests, parse_iteration,
};
pub use descriptor::{DatasetDescriptor, ManifestDescriptor, ModelEntry};
pub use signer::{
    GpgSigner, MockSigner, Signer, SigningOutcome, sign_best_effort, signature_path,
};
pub use verify::{Check, CheckStatus, VerifyReport, verify_manifest};
