//! Labsieve CLI - curation and provenance for lab training data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Collect {
                sources,
                output,
                append,
            } => commands::collect::run(config, sources, output, append),

            Commands::Curate {
                raw,
                curated,
                review,
            } => commands::curate::run(config, raw, curated, review),

            Commands::Manifest {
                models_dir,
                dataset,
                out,
                sign,
                gpg_key,
            } => commands::manifest::run(config, models_dir, dataset, out, sign, gpg_key),

            Commands::Verify { manifest, json } => {
                commands::verify::run(config, manifest, json)
            }

            Commands::Run => commands::run::run(config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-v` selects debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "labsieve=debug" } else { "labsieve=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
