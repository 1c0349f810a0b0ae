//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use kiritori_core::application::defaults;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        std::fs::write(&self.output, template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file to tune chunking");
        println!("2. Validate your configuration:");
        println!("   kiritori validate -c {}", self.output.display());
        println!("3. Use it for chunking:");
        println!(
            "   kiritori chunk -i document.md -c {}",
            self.output.display()
        );

        Ok(())
    }
}

/// Commented configuration template holding the engine defaults
pub fn template() -> String {
    format!(
        r#"# Kiritori configuration

[chunking]
# Upper bound for one chunk, in UTF-8 bytes
max_chunk_size = {max_chunk_size}

# Bytes of preceding text carried into each chunk as context.
# Must be smaller than max_chunk_size.
overlap_size = {overlap_size}

# Keep tables in one chunk when they fit
preserve_tables = true

# Detect markdown, numbered and ALL-CAPS headings
respect_headings = true

# Protect math, chemistry and physics formulas from cuts
handle_formulas = true

# Report runs of plain lines as paragraph elements
detect_paragraphs = false

# Bytes scanned backwards from the size limit for a boundary
search_window = {search_window}

# How formulas are written back: "original", "latex" or "mathml"
formula_format = "original"

# Build chunks on a thread pool once a document has this many chunks
parallel_threshold = {parallel_threshold}

# Worker threads for chunk building (default: all cores)
# threads = 4

# Confidence assigned to each detected element type, in [0, 1]
[chunking.priors]
heading = 0.9
list_item = 0.8
list = 0.85
table = 0.85
display_math = 0.95
inline_math = 0.9
chemistry = 0.8
physics = 0.75
paragraph = 0.7

[output]
# Format used when --format is not given: "json", "jsonl" or "text"
default_format = "json"

# Indent JSON output
pretty_json = true
"#,
        max_chunk_size = defaults::MAX_CHUNK_SIZE,
        overlap_size = defaults::OVERLAP_SIZE,
        search_window = defaults::SEARCH_WINDOW,
        parallel_threshold = defaults::PARALLEL_THRESHOLD,
    )
}
