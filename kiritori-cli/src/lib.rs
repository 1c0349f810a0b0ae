//! Kiritori CLI library
//!
//! This library provides the command-line interface for the Kiritori
//! structure-aware document chunking engine.

pub mod commands;
pub mod config;
pub mod input;
pub mod output;
pub mod progress;

use clap::Parser;

/// Structure-aware document chunking for translation pipelines
#[derive(Debug, Parser)]
#[command(name = "kiritori", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: commands::Commands,
}
