//! Output formatting module

use anyhow::Result;
use kiritori_core::api::{ChunkRecord, Exportable};
use kiritori_core::LayoutChunk;
use serde::Serialize;

pub mod json;
pub mod text;

pub use json::{JsonFormatter, JsonLinesFormatter};
pub use text::TextFormatter;

/// Chunks produced for one input file
#[derive(Debug, Clone)]
pub struct ChunkedDocument {
    pub source: String,
    pub chunks: Vec<LayoutChunk>,
}

/// An export record, tagged with its input file when several were chunked
#[derive(Debug, Serialize)]
pub struct SourcedRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
    #[serde(flatten)]
    pub record: ChunkRecord<'a>,
}

/// Flattens documents into records in input order
pub fn records(documents: &[ChunkedDocument], label_sources: bool) -> Vec<SourcedRecord<'_>> {
    documents
        .iter()
        .flat_map(|document| {
            let source = label_sources.then_some(document.source.as_str());
            document.chunks.iter().map(move |chunk| SourcedRecord {
                source,
                record: chunk.to_record(),
            })
        })
        .collect()
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Writes every document and flushes the underlying writer
    fn write_documents(&mut self, documents: &[ChunkedDocument], label_sources: bool) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ChunkedDocument;
    use kiritori_core::{ChunkerConfig, ChunkingEngine};

    pub fn document(source: &str, text: &str) -> ChunkedDocument {
        let config = ChunkerConfig::builder()
            .max_chunk_size(40)
            .overlap_size(8)
            .build()
            .unwrap();
        let output = ChunkingEngine::new(config)
            .unwrap()
            .chunk_document_with_layout(text)
            .unwrap();
        ChunkedDocument {
            source: source.to_string(),
            chunks: output.chunks,
        }
    }
}
