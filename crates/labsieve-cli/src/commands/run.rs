//! Run command - collect then curate in one pass.

use colored::Colorize;
use labsieve::{Pipeline, PipelineConfig};

use super::curate::print_report;

pub fn run(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let report = Pipeline::with_config(config).run()?;

    println!(
        "{} {} items ({} duplicates) -> {}",
        "Collected".green().bold(),
        report.collect.collected.to_string().white().bold(),
        report.collect.duplicates,
        report.collect.output.display()
    );
    print_report(&report.curate);
    println!();
    println!(
        "After training, run {} to record provenance.",
        "labsieve manifest".cyan().bold()
    );

    Ok(())
}
