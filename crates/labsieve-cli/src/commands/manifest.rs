//! Manifest command - hash dataset and model iterations into a manifest.

use std::path::PathBuf;

use colored::Colorize;
use labsieve::{Pipeline, PipelineConfig, SigningOutcome};

pub fn run(
    mut config: PipelineConfig,
    models_dir: Option<PathBuf>,
    dataset: Option<PathBuf>,
    out: Option<PathBuf>,
    sign: bool,
    gpg_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(models_dir) = models_dir {
        config.manifest.models_dir = models_dir;
    }
    if let Some(dataset) = dataset {
        config.manifest.dataset = dataset;
    }
    if let Some(out) = out {
        config.manifest.output_dir = out;
    }
    apply_signing_flags(&mut config, sign, gpg_key);

    let outcome = Pipeline::with_config(config).build_manifest()?;
    let descriptor = &outcome.manifest.descriptor;

    println!(
        "{} {}",
        "Wrote manifest".green().bold(),
        outcome.manifest.path.display()
    );
    match &descriptor.dataset {
        Some(dataset) => println!(
            "  Dataset:    {} ({})",
            dataset.path,
            dataset.sha256.get(..12).unwrap_or(&dataset.sha256)
        ),
        None => println!("  Dataset:    {}", "none".yellow()),
    }
    println!("  Iterations: {}", descriptor.models.len().to_string().white().bold());
    for model in &descriptor.models {
        let iteration = model
            .iteration
            .map(|n| format!("{:03}", n))
            .unwrap_or_else(|| "?".into());
        let trained_on = match (model.dataset_sha256(), &descriptor.dataset) {
            (Some(recorded), Some(current)) if recorded == current.sha256 => {
                "current dataset".green()
            }
            (Some(_), Some(_)) => "older dataset".yellow(),
            _ => "unknown dataset".dimmed(),
        };
        println!("    {}  {}", iteration, trained_on);
    }

    match outcome.signing {
        Some(SigningOutcome::Signed(signature)) => {
            println!("  Signature:  {}", signature.display().to_string().green());
        }
        Some(SigningOutcome::Skipped(reason)) => {
            println!("  Signature:  {} ({})", "skipped".yellow(), reason);
        }
        None => {}
    }

    Ok(())
}

/// `--gpg-key` implies `--sign`; a key from the config file alone does not.
fn apply_signing_flags(config: &mut PipelineConfig, sign: bool, gpg_key: Option<String>) {
    config.manifest.sign |= sign || gpg_key.is_some();
    if gpg_key.is_some() {
        config.manifest.gpg_key = gpg_key;
    }
}
