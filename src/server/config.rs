use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional TOML configuration. Every field has a CLI counterpart; flags
/// given on the command line win.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub listen: Option<String>,
    pub fixtures: Option<PathBuf>,
    pub categories_file: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
