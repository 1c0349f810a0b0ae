//! Structure-aware semantic chunking for translation pipelines
//!
//! This crate splits arbitrarily long documents into bounded chunks while
//! choosing cut points that respect linguistic and document structure,
//! carrying a bounded slice of preceding context across every cut, and
//! protecting mathematical, chemical and physical formulas from being split.
//!
//! # Architecture
//!
//! The crate follows a layered layout:
//! - **Domain layer**: pure algorithms (boundary pattern cascade, cut-point
//!   resolution, formula codec, structural element detection, chunk values)
//! - **Application layer**: configuration, the chunking engine, parallel
//!   chunk materialization, diagnostics and cancellation
//! - **API layer**: the stable JSON export format
//!
//! # Example
//!
//! ```rust
//! use kiritori_core::{ChunkerConfig, ChunkingEngine};
//!
//! let config = ChunkerConfig::builder()
//!     .max_chunk_size(40)
//!     .overlap_size(10)
//!     .build()
//!     .unwrap();
//! let engine = ChunkingEngine::new(config).unwrap();
//!
//! let text = "Water is H2O. The energy is $E = mc^2$ here.\n\nA new paragraph starts.";
//! let output = engine.chunk_document_with_layout(text).unwrap();
//!
//! // Chunks reconstruct the input exactly
//! assert_eq!(output.reconstruct(), text);
//! assert!(output.chunks.len() > 1);
//! assert!(output.chunks.iter().all(|c| c.chunk.main_content.len() <= 40));
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod error;

pub use api::{to_json, to_json_lines, to_json_pretty, Exportable};
pub use application::{
    CancellationToken, ChunkerConfig, ChunkerConfigBuilder, ChunkingEngine, ChunkingOutput,
    CollectingSink, DiagnosticSink, LogSink, NullSink,
};
pub use domain::{
    Chunk, ChunkMetadata, ConfidencePriors, ElementMetadata, ElementType, Formula, FormulaKind,
    LayoutChunk, LayoutElement, LayoutMetadata, PatternCascade, RestoreFormat,
};
pub use error::{ChunkingError, ChunkingWarning, Result};
