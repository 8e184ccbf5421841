//! Collect command - walk source directories into the raw dataset.

use std::path::PathBuf;

use colored::Colorize;
use labsieve::{Pipeline, PipelineConfig};

pub fn run(
    mut config: PipelineConfig,
    sources: Vec<PathBuf>,
    output: Option<PathBuf>,
    append: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !sources.is_empty() {
        config.collector.sources = sources;
    }
    if let Some(output) = output {
        config.collector.output = output;
    }
    config.collector.append |= append;

    let report = Pipeline::with_config(config).collect()?;

    println!(
        "{} {} items -> {}",
        "Collected".green().bold(),
        report.collected.to_string().white().bold(),
        report.output.display()
    );
    if report.duplicates > 0 {
        println!("  Duplicates skipped: {}", report.duplicates.to_string().yellow());
    }
    if report.empty > 0 {
        println!("  Empty files:        {}", report.empty);
    }
    if report.truncated > 0 {
        println!("  Truncated:          {}", report.truncated.to_string().yellow());
    }
    if report.unreadable > 0 {
        println!("  Unreadable:         {}", report.unreadable.to_string().red());
    }
    if report.missing_sources > 0 {
        println!(
            "  Missing sources:    {}",
            report.missing_sources.to_string().red()
        );
    }
    println!();
    println!(
        "Run {} to redact and classify.",
        "labsieve curate".cyan().bold()
    );

    Ok(())
}
