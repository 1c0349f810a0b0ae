//! Configuration file support
//!
//! A CLI configuration file holds the engine settings under `[chunking]` and
//! output preferences under `[output]`. Every key is optional.

use anyhow::{Context, Result};
use kiritori_core::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::chunk::OutputFormat;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Chunking engine configuration
    #[serde(default)]
    pub chunking: ChunkerConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--format` is not given
    pub default_format: OutputFormat,

    /// Indent JSON arrays
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Json,
            pretty_json: true,
        }
    }
}

impl CliConfig {
    /// Parses a configuration document and validates the chunking section
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;
        config
            .chunking
            .validate()
            .context("Invalid [chunking] section")?;
        Ok(config)
    }

    /// Loads and validates a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }
}
