//! Chunk command implementation

use anyhow::{Context, Result};
use clap::Args;
use kiritori_core::{ChunkerConfig, ChunkingEngine, ChunkingError, RestoreFormat};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::CliConfig;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{
    ChunkedDocument, JsonFormatter, JsonLinesFormatter, OutputFormatter, TextFormatter,
};
use crate::progress::ProgressReporter;

/// Arguments for the chunk command
#[derive(Debug, Args)]
pub struct ChunkArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the configuration file, else json)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", env = "KIRITORI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum chunk size in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_chunk_size: Option<usize>,

    /// Bytes of preceding text carried as context
    #[arg(long, value_name = "BYTES")]
    pub overlap: Option<usize>,

    /// Allow cuts inside tables
    #[arg(long)]
    pub no_tables: bool,

    /// Do not detect headings
    #[arg(long)]
    pub no_headings: bool,

    /// Leave formulas unprotected
    #[arg(long)]
    pub no_formulas: bool,

    /// How protected formulas are written back into chunks
    #[arg(long, value_enum)]
    pub formula_format: Option<FormulaFormat>,

    /// Worker threads, used both across input files and within each file
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of chunk records
    Json,
    /// One chunk record per line
    Jsonl,
    /// Human-readable chunks with headers
    Text,
}

/// Formula restoration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormulaFormat {
    /// The formula text as written
    Original,
    /// LaTeX wrapped in `$` delimiters
    Latex,
    /// Presentation MathML
    Mathml,
}

impl From<FormulaFormat> for RestoreFormat {
    fn from(format: FormulaFormat) -> Self {
        match format {
            FormulaFormat::Original => RestoreFormat::Original,
            FormulaFormat::Latex => RestoreFormat::Latex,
            FormulaFormat::Mathml => RestoreFormat::Mathml,
        }
    }
}

impl ChunkArgs {
    /// Execute the chunk command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);
        log::debug!("Arguments: {:?}", self);

        let cli_config = match &self.config {
            Some(path) => CliConfig::from_file(path)?,
            None => CliConfig::default(),
        };
        let format = self.format.unwrap_or(cli_config.output.default_format);
        let config = self.chunker_config(cli_config.chunking);
        let engine = ChunkingEngine::new(config).context("Invalid chunking configuration")?;

        let files = resolve_patterns(&self.input)?;
        log::info!("Chunking {} file(s)", files.len());

        let mut progress = ProgressReporter::new(self.quiet || files.len() < 2);
        progress.init_files(files.len() as u64);

        let pool = file_pool(engine.config().threads)?;
        let chunk_all = || {
            files
                .par_iter()
                .map(|path| {
                    let document = chunk_file(&engine, path);
                    if let Ok(Some(document)) = &document {
                        progress.file_completed(&document.source, document.chunks.len());
                    }
                    document
                })
                .collect::<Result<Vec<_>>>()
        };
        let documents = match &pool {
            Some(pool) => pool.install(chunk_all),
            None => chunk_all(),
        }?;
        progress.finish();

        let documents: Vec<ChunkedDocument> = documents.into_iter().flatten().collect();
        let mut formatter = self.formatter(format, cli_config.output.pretty_json)?;
        formatter.write_documents(&documents, files.len() > 1)?;

        Ok(())
    }

    /// Applies command-line overrides on top of the file configuration
    fn chunker_config(&self, mut config: ChunkerConfig) -> ChunkerConfig {
        if let Some(size) = self.max_chunk_size {
            config.max_chunk_size = size;
            if self.overlap.is_none() && config.overlap_size >= size {
                config.overlap_size = size / 10;
                log::info!(
                    "overlap reduced to {} bytes to fit --max-chunk-size",
                    config.overlap_size
                );
            }
        }
        if let Some(overlap) = self.overlap {
            config.overlap_size = overlap;
        }
        if self.no_tables {
            config.preserve_tables = false;
        }
        if self.no_headings {
            config.respect_headings = false;
        }
        if self.no_formulas {
            config.handle_formulas = false;
        }
        if let Some(format) = self.formula_format {
            config.formula_format = format.into();
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config
    }

    fn formatter(&self, format: OutputFormat, pretty: bool) -> Result<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };

        Ok(match format {
            OutputFormat::Json => Box::new(JsonFormatter::new(writer, pretty)),
            OutputFormat::Jsonl => Box::new(JsonLinesFormatter::new(writer)),
            OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        })
    }
}

/// Pool for file-level work; without a thread count rayon's global pool is used
fn file_pool(threads: Option<usize>) -> Result<Option<rayon::ThreadPool>> {
    threads
        .map(|threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("kiritori-file-{i}"))
                .build()
                .context("Failed to build the file worker pool")
        })
        .transpose()
}

/// Chunks one file; empty files are skipped with a warning
fn chunk_file(engine: &ChunkingEngine, path: &Path) -> Result<Option<ChunkedDocument>> {
    let text = FileReader::read_text(path)?;
    log::info!("Chunking {} ({} bytes)", path.display(), text.len());

    match engine.chunk_document_with_layout(&text) {
        Ok(output) => Ok(Some(ChunkedDocument {
            source: path.display().to_string(),
            chunks: output.chunks,
        })),
        Err(ChunkingError::InvalidInput { reason }) => {
            log::warn!("Skipping {}: {reason}", path.display());
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("Failed to chunk {}", path.display())),
    }
}
