//! relmeta CLI library
//!
//! Loading of model directories and table ordering for the `relmeta`
//! binary (main.rs), kept in a library so both can be tested.

pub mod dependency_ordering;
pub mod model_loader;

use anyhow::Context;
use relmeta::MetadataConfig;
use std::path::Path;

/// Resolve the compiler settings: the config file (or `config/config.toml`),
/// then env vars, then an explicit command-line override.
pub fn load_config(
    config_file: Option<&Path>,
    max_identifier_length: Option<usize>,
) -> anyhow::Result<MetadataConfig> {
    let mut config = match config_file {
        Some(path) => MetadataConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => MetadataConfig::load().context("failed to load config")?,
    };

    if let Some(max) = max_identifier_length {
        config.max_identifier_length = max;
    }
    log::debug!("max identifier length: {}", config.max_identifier_length);
    Ok(config)
}
