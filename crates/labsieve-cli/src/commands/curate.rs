//! Curate command - redact, classify and split the raw dataset.

use std::path::PathBuf;

use colored::Colorize;
use labsieve::{CurationReport, Pipeline, PipelineConfig};

pub fn run(
    mut config: PipelineConfig,
    raw: Option<PathBuf>,
    curated: Option<PathBuf>,
    review: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(raw) = raw {
        config.curator.raw = raw;
    }
    if let Some(curated) = curated {
        config.curator.curated = curated;
    }
    if let Some(review) = review {
        config.curator.review = review;
    }

    let report = Pipeline::with_config(config).curate()?;
    print_report(&report);

    Ok(())
}

/// Summary shared with the `run` command.
pub fn print_report(report: &CurationReport) {
    let counts = &report.counts;

    println!(
        "{} {} records",
        "Curated".green().bold(),
        counts.input.to_string().white().bold()
    );
    println!(
        "  Curated:   {} -> {}",
        counts.curated.to_string().green(),
        report.curated_path.display()
    );
    println!(
        "  Review:    {} -> {}",
        counts.reviewed.to_string().yellow(),
        report.review_path.display()
    );
    if counts.dropped > 0 {
        println!("  Dropped:   {}", counts.dropped);
    }
    if counts.malformed > 0 {
        println!("  Malformed: {}", counts.malformed.to_string().red());
    }

    if counts.reviewed > 0 {
        println!();
        println!(
            "{} records need human review in {}",
            counts.reviewed.to_string().yellow().bold(),
            report.review_path.display()
        );
    }
}
