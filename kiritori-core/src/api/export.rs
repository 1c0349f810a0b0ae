//! Stable JSON export of chunks
//!
//! Every chunk, plain or layout-annotated, serializes to the same record
//! shape. Field order is fixed and `element_counts` keys are sorted, so the
//! output is byte-identical for identical input and configuration.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::chunk::{Chunk, ChunkMetadata, LayoutChunk, LayoutMetadata};
use crate::domain::layout::{ElementMetadata, ElementType, LayoutElement};

/// Serializable view of one chunk
#[derive(Debug, Clone, Serialize)]
pub struct ChunkRecord<'a> {
    pub chunk_id: usize,
    pub text: &'a str,
    pub main_content: &'a str,
    pub metadata: &'a ChunkMetadata,
    pub context: Option<&'a str>,
    pub structure_type: &'static str,
    pub layout_metadata: LayoutMetadata,
    pub layout_elements: Vec<ElementRecord<'a>>,
}

/// Serializable view of one layout element
#[derive(Debug, Clone, Serialize)]
pub struct ElementRecord<'a> {
    #[serde(rename = "type")]
    pub element_type: &'static str,
    pub content: &'a str,
    pub metadata: &'a ElementMetadata,
    pub position: (usize, usize),
    pub confidence: f64,
}

impl<'a> From<&'a LayoutElement> for ElementRecord<'a> {
    fn from(element: &'a LayoutElement) -> Self {
        Self {
            element_type: element.element_type().as_str(),
            content: &element.content,
            metadata: &element.metadata,
            position: element.position,
            confidence: element.confidence,
        }
    }
}

/// Anything that can be exported as a [`ChunkRecord`]
pub trait Exportable {
    fn to_record(&self) -> ChunkRecord<'_>;
}

impl Exportable for Chunk {
    fn to_record(&self) -> ChunkRecord<'_> {
        ChunkRecord {
            chunk_id: self.chunk_id,
            text: &self.text,
            main_content: &self.main_content,
            metadata: &self.metadata,
            context: self.context.as_deref(),
            structure_type: ElementType::Paragraph.as_str(),
            layout_metadata: LayoutMetadata {
                element_counts: BTreeMap::new(),
                layout_confidence: 0.0,
                has_formulas: false,
            },
            layout_elements: Vec::new(),
        }
    }
}

impl Exportable for LayoutChunk {
    fn to_record(&self) -> ChunkRecord<'_> {
        let chunk = &self.chunk;
        ChunkRecord {
            chunk_id: chunk.chunk_id,
            text: &chunk.text,
            main_content: &chunk.main_content,
            metadata: &chunk.metadata,
            context: chunk.context.as_deref(),
            structure_type: self.structure_type.as_str(),
            layout_metadata: self.layout_metadata.clone(),
            layout_elements: self.layout_elements.iter().map(ElementRecord::from).collect(),
        }
    }
}

/// Serializes chunks as a compact JSON array
pub fn to_json<T: Exportable>(chunks: &[T]) -> serde_json::Result<String> {
    let records: Vec<ChunkRecord<'_>> = chunks.iter().map(Exportable::to_record).collect();
    serde_json::to_string(&records)
}

/// Serializes chunks as an indented JSON array
pub fn to_json_pretty<T: Exportable>(chunks: &[T]) -> serde_json::Result<String> {
    let records: Vec<ChunkRecord<'_>> = chunks.iter().map(Exportable::to_record).collect();
    serde_json::to_string_pretty(&records)
}

/// Serializes chunks as JSON Lines, one record per line
pub fn to_json_lines<T: Exportable>(chunks: &[T]) -> serde_json::Result<String> {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&serde_json::to_string(&chunk.to_record())?);
        out.push('\n');
    }
    Ok(out)
}
