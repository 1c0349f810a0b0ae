//! Engine configuration
//!
//! All sizes are byte counts. Configurations are validated once, when the
//! engine is built, so a running engine never sees invalid parameters.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::formula::RestoreFormat;
use crate::domain::layout::LayoutOptions;
use crate::domain::priors::ConfidencePriors;
use crate::error::{ChunkingError, Result};

/// Default values shared by the engine, presets and the CLI
pub mod defaults {
    /// Maximum chunk size in bytes
    pub const MAX_CHUNK_SIZE: usize = 4000;

    /// Trailing context carried into the next chunk, in bytes
    pub const OVERLAP_SIZE: usize = 200;

    /// Trailing window searched for boundary patterns, in bytes
    pub const SEARCH_WINDOW: usize = crate::domain::cut::DEFAULT_SEARCH_WINDOW;

    /// Number of chunks at which materialization moves to the thread pool
    pub const PARALLEL_THRESHOLD: usize = 64;
}

/// Configuration for [`ChunkingEngine`](crate::ChunkingEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Upper bound on the byte length of a chunk's main content
    pub max_chunk_size: usize,

    /// Maximum bytes of preceding text carried as context
    pub overlap_size: usize,

    /// Keep tables that fit in a chunk from being split
    pub preserve_tables: bool,

    /// Detect headings as structural elements
    pub respect_headings: bool,

    /// Protect formulas with placeholder tokens during boundary search
    pub handle_formulas: bool,

    /// Emit paragraph elements for runs of plain lines
    pub detect_paragraphs: bool,

    /// Size of the trailing window scanned by the pattern cascade
    pub search_window: usize,

    /// Representation formulas are restored to in chunk output
    pub formula_format: RestoreFormat,

    /// Minimum chunk count for parallel materialization
    pub parallel_threshold: usize,

    /// Worker threads (None = number of CPUs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Confidence assigned to each detected element type
    pub priors: ConfidencePriors,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: defaults::MAX_CHUNK_SIZE,
            overlap_size: defaults::OVERLAP_SIZE,
            preserve_tables: true,
            respect_headings: true,
            handle_formulas: true,
            detect_paragraphs: false,
            search_window: defaults::SEARCH_WINDOW,
            formula_format: RestoreFormat::Original,
            parallel_threshold: defaults::PARALLEL_THRESHOLD,
            threads: None,
            priors: ConfidencePriors::default(),
        }
    }
}

impl ChunkerConfig {
    /// Creates a new builder for ChunkerConfig
    pub fn builder() -> ChunkerConfigBuilder {
        ChunkerConfigBuilder::new()
    }

    /// Preset for translation pipelines: large chunks, generous context
    pub fn translation() -> Self {
        Self {
            max_chunk_size: 6000,
            overlap_size: 400,
            ..Default::default()
        }
    }

    /// Preset for short texts and tests: small chunks, no thread pool
    pub fn small() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap_size: 100,
            parallel_threshold: usize::MAX,
            ..Default::default()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(ChunkingError::configuration(
                "max_chunk_size must be greater than 0",
            ));
        }

        if self.overlap_size >= self.max_chunk_size {
            return Err(ChunkingError::configuration(format!(
                "overlap_size ({}) must be less than max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }

        if self.search_window == 0 {
            return Err(ChunkingError::configuration(
                "search_window must be greater than 0",
            ));
        }

        if self.threads == Some(0) {
            return Err(ChunkingError::configuration(
                "threads must be greater than 0",
            ));
        }

        if let Some(name) = self.priors.first_invalid() {
            return Err(ChunkingError::configuration(format!(
                "confidence prior '{name}' must lie in [0, 1]"
            )));
        }

        Ok(())
    }

    /// Layout detection switches derived from this configuration
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            respect_headings: self.respect_headings,
            preserve_tables: self.preserve_tables,
            detect_paragraphs: self.detect_paragraphs,
        }
    }

    /// Parses and validates a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ChunkingError::configuration(format!("failed to parse configuration: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ChunkingError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ChunkingError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            ChunkingError::configuration(format!("failed to serialize configuration: {e}"))
        })
    }
}

/// Builder for ChunkerConfig with fluent API
#[derive(Debug, Clone)]
pub struct ChunkerConfigBuilder {
    config: ChunkerConfig,
}

impl ChunkerConfigBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }

    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    pub fn overlap_size(mut self, size: usize) -> Self {
        self.config.overlap_size = size;
        self
    }

    pub fn preserve_tables(mut self, enabled: bool) -> Self {
        self.config.preserve_tables = enabled;
        self
    }

    pub fn respect_headings(mut self, enabled: bool) -> Self {
        self.config.respect_headings = enabled;
        self
    }

    pub fn handle_formulas(mut self, enabled: bool) -> Self {
        self.config.handle_formulas = enabled;
        self
    }

    pub fn detect_paragraphs(mut self, enabled: bool) -> Self {
        self.config.detect_paragraphs = enabled;
        self
    }

    pub fn search_window(mut self, size: usize) -> Self {
        self.config.search_window = size;
        self
    }

    pub fn formula_format(mut self, format: RestoreFormat) -> Self {
        self.config.formula_format = format;
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Sets the number of worker threads (None = number of CPUs)
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn priors(mut self, priors: ConfidencePriors) -> Self {
        self.config.priors = priors;
        self
    }

    /// Builds the configuration, validating parameters
    pub fn build(self) -> Result<ChunkerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Builds the configuration without validation (for testing)
    pub fn build_unchecked(self) -> ChunkerConfig {
        self.config
    }
}

impl Default for ChunkerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ChunkerConfig::default();
        assert_eq!(config.max_chunk_size, 4000);
        assert_eq!(config.overlap_size, 200);
        assert_eq!(config.search_window, 400);
        assert!(config.handle_formulas);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ChunkerConfig {
            max_chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());

        let config = ChunkerConfig {
            max_chunk_size: 100,
            overlap_size: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChunkerConfig {
            search_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChunkerConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_prior_is_rejected() {
        let err = ChunkerConfig::builder()
            .priors(ConfidencePriors {
                heading: -0.1,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("heading"));
    }

    #[test]
    fn test_builder() {
        let config = ChunkerConfig::builder()
            .max_chunk_size(500)
            .overlap_size(50)
            .preserve_tables(false)
            .formula_format(RestoreFormat::Latex)
            .build()
            .unwrap();
        assert_eq!(config.max_chunk_size, 500);
        assert!(!config.preserve_tables);
        assert_eq!(config.formula_format, RestoreFormat::Latex);

        let unchecked = ChunkerConfig::builder().max_chunk_size(0).build_unchecked();
        assert_eq!(unchecked.max_chunk_size, 0);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ChunkerConfig::translation().validate().is_ok());
        let small = ChunkerConfig::small();
        assert!(small.validate().is_ok());
        assert_eq!(small.parallel_threshold, usize::MAX);
    }

    #[test]
    fn test_toml_partial_document_uses_defaults() {
        let config = ChunkerConfig::from_toml_str(
            r#"
max_chunk_size = 800
formula_format = "mathml"

[priors]
table = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.max_chunk_size, 800);
        assert_eq!(config.overlap_size, 200);
        assert_eq!(config.formula_format, RestoreFormat::Mathml);
        assert_eq!(config.priors.table, 0.5);
        assert_eq!(config.priors.heading, 0.9);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ChunkerConfig::builder()
            .max_chunk_size(1234)
            .threads(Some(2))
            .build()
            .unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ChunkerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_toml_validation_applies() {
        let err = ChunkerConfig::from_toml_str("max_chunk_size = 10\noverlap_size = 20\n")
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_chunk_size = 300\noverlap_size = 30").unwrap();
        let config = ChunkerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_chunk_size, 300);

        let err = ChunkerConfig::from_file("/nonexistent/kiritori.toml").unwrap_err();
        assert!(matches!(err, ChunkingError::ConfigLoad { .. }));
    }
}
