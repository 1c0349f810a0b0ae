//! Error and warning types
//!
//! Fatal conditions abort a chunking call and are reported through
//! [`ChunkingError`]. Non-fatal conditions never abort a run; they are
//! collected as [`ChunkingWarning`]s and returned next to the chunks.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::formula::FormulaKind;

/// Fatal errors raised by the chunking engine
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Invalid construction parameters, raised before any work begins
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// Input rejected by the engine (empty text)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The caller cancelled the run; no partial result is produced
    #[error("Chunking cancelled after {chunks_resolved} resolved cut points")]
    Cancelled { chunks_resolved: usize },

    /// A configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },
}

impl ChunkingError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        ChunkingError::Configuration {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by invalid configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ChunkingError::Configuration { .. } | ChunkingError::ConfigLoad { .. }
        )
    }
}

impl From<regex::Error> for ChunkingError {
    fn from(err: regex::Error) -> Self {
        ChunkingError::configuration(format!("invalid boundary pattern: {err}"))
    }
}

/// Non-fatal conditions reported alongside a complete chunk sequence
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChunkingWarning {
    /// A single formula candidate could not be converted and was dropped
    #[error("Dropped {kind} formula {text:?} at byte {position}: {reason}")]
    FormulaConversion {
        text: String,
        kind: FormulaKind,
        position: usize,
        reason: String,
    },

    /// A placeholder token could not be resolved; the literal token was kept
    #[error("Unresolved formula placeholder {token}: {reason}")]
    PlaceholderResolution { token: String, reason: String },
}

/// Result type for chunking operations
pub type Result<T> = std::result::Result<T, ChunkingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ChunkingError::configuration("overlap_size must be less than max_chunk_size");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: overlap_size must be less than max_chunk_size"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_input_is_not_configuration() {
        let err = ChunkingError::InvalidInput {
            reason: "text is empty".into(),
        };
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "Invalid input: text is empty");
    }

    #[test]
    fn test_regex_error_maps_to_configuration() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: ChunkingError = regex_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("invalid boundary pattern"));
    }

    #[test]
    fn test_warning_display() {
        let warning = ChunkingWarning::FormulaConversion {
            text: "Xq2".into(),
            kind: FormulaKind::Chemistry,
            position: 12,
            reason: "unknown element symbol 'Xq'".into(),
        };
        let message = warning.to_string();
        assert!(message.contains("chemistry"));
        assert!(message.contains("byte 12"));
        assert!(message.contains("Xq"));
    }
}
