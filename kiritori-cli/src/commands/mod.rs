//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod chunk;
pub mod generate_config;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split documents into structure-aware chunks
    Chunk(chunk::ChunkArgs),

    /// Write a commented configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Check a configuration file
    Validate(validate::ValidateArgs),
}

impl Commands {
    /// Execute the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Chunk(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` still takes precedence over the verbosity flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    // A second initialization (tests running several commands) is harmless
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_commands_debug_format() {
        let validate = Commands::Validate(validate::ValidateArgs {
            config: PathBuf::from("kiritori.toml"),
        });
        let debug_str = format!("{:?}", validate);
        assert!(debug_str.contains("Validate"));
        assert!(debug_str.contains("kiritori.toml"));

        let generate = Commands::GenerateConfig(generate_config::GenerateConfigArgs {
            output: PathBuf::from("out.toml"),
            force: false,
        });
        assert!(format!("{:?}", generate).contains("GenerateConfig"));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(0, false);
        init_logging(2, true);
    }
}
