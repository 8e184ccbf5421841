//! Detached signing of manifests.
//!
//! The builder only knows the [`Signer`] trait. [`GpgSigner`] shells out to
//! GnuPG; [`MockSigner`] writes a predictable signature file for tests and
//! dry runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::digest::sha256_file;
use crate::error::{Result, SieveError};

/// Produces a detached signature for a file.
pub trait Signer {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Sign `path`, returning the signature file written next to it.
    fn sign(&self, path: &Path) -> Result<PathBuf>;
}

/// Result of a best-effort signing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOutcome {
    Signed(PathBuf),
    /// Signing failed; the manifest stays unsigned.
    Skipped(String),
}

/// Sign `path`, downgrading any failure to [`SigningOutcome::Skipped`].
pub fn sign_best_effort(signer: &dyn Signer, path: &Path) -> SigningOutcome {
    match signer.sign(path) {
        Ok(signature) => {
            tracing::info!(signer = signer.name(), "Signed {}", signature.display());
            SigningOutcome::Signed(signature)
        }
        Err(e) => {
            tracing::warn!(signer = signer.name(), "Signing failed, manifest left unsigned: {}", e);
            SigningOutcome::Skipped(e.to_string())
        }
    }
}

/// Companion signature path: `<file>.asc`.
pub fn signature_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".asc");
    PathBuf::from(name)
}

/// Armored detached signatures through the `gpg` command.
#[derive(Debug, Clone)]
pub struct GpgSigner {
    program: PathBuf,
    key_id: Option<String>,
}

impl GpgSigner {
    /// Use `gpg` from `PATH` and its default key.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("gpg"),
            key_id: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_key(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    fn args(&self, path: &Path, signature: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(key) = &self.key_id {
            args.push("--local-user".to_string());
            args.push(key.clone());
        }
        args.extend([
            "--armor".to_string(),
            "--detach-sign".to_string(),
            "--output".to_string(),
            signature.to_string_lossy().into_owned(),
            path.to_string_lossy().into_owned(),
        ]);
        args
    }
}

impl Default for GpgSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for GpgSigner {
    fn name(&self) -> &str {
        "gpg"
    }

    fn sign(&self, path: &Path) -> Result<PathBuf> {
        let signature = signature_path(path);
        let output = Command::new(&self.program)
            .args(self.args(path, &signature))
            .output()
            .map_err(|e| {
                SieveError::Signing(format!("could not run '{}': {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SieveError::Signing(format!(
                "'{}' exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(signature)
    }
}

/// Writes `<file>.asc` containing the file's SHA-256, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MockSigner {
    failure: Option<String>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signer whose every attempt fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
        }
    }
}

impl Signer for MockSigner {
    fn name(&self) -> &str {
        "mock"
    }

    fn sign(&self, path: &Path) -> Result<PathBuf> {
        if let Some(reason) = &self.failure {
            return Err(SieveError::Signing(reason.clone()));
        }
        let digest = sha256_file(path)?;
        let signature = signature_path(path);
        fs::write(&signature, format!("MOCK SIGNATURE sha256:{}\n", digest))
            .map_err(|e| SieveError::io(&signature, e))?;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_signature_path() {
        assert_eq!(
            signature_path(Path::new("out/manifest_20250101T000000Z.json")),
            PathBuf::from("out/manifest_20250101T000000Z.json.asc")
        );
    }

    #[test]
    fn test_gpg_args_with_key() {
        let signer = GpgSigner::new().with_key("lab@thefool");
        let args = signer.args(Path::new("m.json"), Path::new("m.json.asc"));
        assert_eq!(
            args,
            vec![
                "--local-user",
                "lab@thefool",
                "--armor",
                "--detach-sign",
                "--output",
                "m.json.asc",
                "m.json"
            ]
        );
    }

    #[test]
    fn test_gpg_args_default_key() {
        let args = GpgSigner::new().args(Path::new("m.json"), Path::new("m.json.asc"));
        assert_eq!(args[0], "--armor");
    }

    #[test]
    fn test_missing_program_is_signing_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, "{}").unwrap();

        let signer = GpgSigner::new().with_program(dir.path().join("no-such-gpg"));
        assert!(matches!(signer.sign(&path), Err(SieveError::Signing(_))));
        assert!(matches!(
            sign_best_effort(&signer, &path),
            SigningOutcome::Skipped(_)
        ));
    }

    #[test]
    fn test_mock_signer_writes_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, "{}").unwrap();

        let outcome = sign_best_effort(&MockSigner::new(), &path);
        let signature = signature_path(&path);
        assert_eq!(outcome, SigningOutcome::Signed(signature.clone()));

        let body = fs::read_to_string(signature).unwrap();
        assert!(body.contains(&sha256_file(&path).unwrap()));
    }

    #[test]
    fn test_failing_mock_signer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, "{}").unwrap();

        match sign_best_effort(&MockSigner::failing("no key"), &path) {
            SigningOutcome::Skipped(reason) => assert!(reason.contains("no key")),
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(!signature_path(&path).exists());
    }
}
