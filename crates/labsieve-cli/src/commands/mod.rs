//! CLI command implementations.

pub mod collect;
pub mod curate;
pub mod manifest;
pub mod run;
pub mod verify;

use std::path::Path;

use labsieve::PipelineConfig;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "labsieve.toml";

/// Load the pipeline configuration: `--config`, else `./labsieve.toml`, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
        None => {
            tracing::debug!("No configuration file, using defaults");
            return Ok(PipelineConfig::default());
        }
    };

    tracing::debug!(path = %path.display(), "Loading configuration");
    Ok(PipelineConfig::from_file(path)?)
}
