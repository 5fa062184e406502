//! Subcommands.

pub mod config;
pub mod extract;
pub mod run;

use std::path::{Path, PathBuf};

use fattura_core::FatturaConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fattura")
        .join("config.json")
}

/// The file passed with `--config`, else the user configuration file.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map_or_else(default_config_path, PathBuf::from)
}

/// Load the config passed with `--config`, else the user config file when it
/// exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FatturaConfig> {
    if let Some(path) = config_path {
        return FatturaConfig::from_file(Path::new(path)).map_err(|e| {
            anyhow::anyhow!("Failed to load config {}: {}", path, e)
        });
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(FatturaConfig::from_file(&default_path)?)
    } else {
        Ok(FatturaConfig::default())
    }
}
