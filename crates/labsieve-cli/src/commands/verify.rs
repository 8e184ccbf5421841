//! Verify command - recompute the hashes a manifest records.

use std::path::PathBuf;

use colored::Colorize;
use labsieve::manifest::{Check, CheckStatus, list_manifests};
use labsieve::{Pipeline, PipelineConfig};

pub fn run(
    config: PipelineConfig,
    manifest: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = match manifest {
        Some(path) => path,
        None => list_manifests(&config.manifest.output_dir)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                format!(
                    "No manifests in {}\nRun 'labsieve manifest' first.",
                    config.manifest.output_dir.display()
                )
            })?,
    };

    let report = Pipeline::with_config(config).verify_manifest(&manifest)?;

    if json_output {
        let status = serde_json::json!({
            "clean": report.is_clean(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!(
            "{} {}",
            "Verifying".cyan().bold(),
            report.manifest.display().to_string().white()
        );
        println!();
        match &report.dataset {
            Some(check) => print_check("dataset", check),
            None => println!("  {:<10} {}", "dataset", "not recorded".dimmed()),
        }
        for check in &report.models {
            print_check("model", check);
        }
        println!();
        if report.is_clean() {
            println!("{}", "All recorded hashes match.".green().bold());
        }
    }

    if !report.is_clean() {
        return Err(format!(
            "{} entries no longer match {}",
            report.failures().count(),
            report.manifest.display()
        )
        .into());
    }

    Ok(())
}

fn print_check(kind: &str, check: &Check) {
    let status = match &check.status {
        CheckStatus::Match => "ok".green(),
        CheckStatus::Mismatch { .. } => "changed".red().bold(),
        CheckStatus::Missing => "missing".red(),
        CheckStatus::Unrecorded => "no hash".yellow(),
    };
    println!("  {:<10} {:<8} {}", kind, status, check.path);
}
