//! Validate command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::CliConfig;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match CliConfig::from_file(&self.config) {
            Ok(config) => {
                let chunking = &config.chunking;
                println!("✓ Configuration is valid!");
                println!("  Max chunk size: {} bytes", chunking.max_chunk_size);
                println!("  Overlap: {} bytes", chunking.overlap_size);
                println!("  Formula format: {}", chunking.formula_format.as_str());
                println!(
                    "  Worker threads: {}",
                    chunking.threads.unwrap_or_else(num_cpus::get)
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e:#}");
                Err(e.context("Validation failed"))
            }
        }
    }
}
