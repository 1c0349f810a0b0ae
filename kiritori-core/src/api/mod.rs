//! Stable export surface for chunking results
//!
//! Downstream consumers (translation workers, the CLI) depend on the JSON
//! shape produced here rather than on the internal chunk types.

pub mod export;

pub use export::{to_json, to_json_lines, to_json_pretty, ChunkRecord, ElementRecord, Exportable};
