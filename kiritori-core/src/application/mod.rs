//! Application layer orchestrating the chunking pipeline
//!
//! This module sits between the pure domain algorithms and callers. It owns
//! configuration and validation, the scan loop, parallel chunk
//! materialization, diagnostics and cancellation.
//!
//! # Example
//!
//! ```rust
//! use kiritori_core::application::{ChunkerConfig, ChunkingEngine};
//!
//! let config = ChunkerConfig::builder()
//!     .max_chunk_size(64)
//!     .overlap_size(16)
//!     .build()
//!     .unwrap();
//! let engine = ChunkingEngine::new(config).unwrap();
//!
//! let text = "First sentence of the text. Second sentence of the text. Third one.";
//! let output = engine.chunk_document(text).unwrap();
//! assert_eq!(output.reconstruct(), text);
//! ```

pub mod builder;
pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod parallel;

pub use builder::{ChunkBuilder, ChunkSpan};
pub use cancel::CancellationToken;
pub use config::{defaults, ChunkerConfig, ChunkerConfigBuilder};
pub use diagnostics::{CollectingSink, DiagnosticSink, LogSink, NullSink};
pub use engine::{ChunkingEngine, ChunkingOutput};
pub use parallel::ChunkMaterializer;
