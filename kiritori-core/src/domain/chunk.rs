//! Chunk value objects

use serde::Serialize;
use std::collections::BTreeMap;

use super::layout::{ElementType, LayoutElement};

/// Opening marker around carried-over context in decorated chunk text
pub const CONTEXT_OPEN: &str = "[CONTEXT]";
/// Closing marker around carried-over context in decorated chunk text
pub const CONTEXT_CLOSE: &str = "[/CONTEXT]";

/// Positional and size metadata for one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    pub chunk_id: usize,
    /// Start byte offset in the placeholder-substituted text
    pub start_pos: usize,
    /// End byte offset (exclusive) in the placeholder-substituted text
    pub end_pos: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub has_context: bool,
    /// Start byte offset in the caller's text
    pub original_start: usize,
    /// End byte offset (exclusive) in the caller's text
    pub original_end: usize,
}

/// A bounded slice of the document plus optional leading context
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub chunk_id: usize,
    /// `main_content`, preceded by the marked-up context when present
    pub text: String,
    pub main_content: String,
    pub metadata: ChunkMetadata,
    pub context: Option<String>,
}

impl Chunk {
    pub fn has_context(&self) -> bool {
        self.metadata.has_context
    }

    /// Byte length of `main_content`
    pub fn len(&self) -> usize {
        self.main_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main_content.is_empty()
    }
}

impl AsRef<Chunk> for Chunk {
    fn as_ref(&self) -> &Chunk {
        self
    }
}

/// Wraps `main` with context markers when `context` is present
pub fn decorate(main: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("{CONTEXT_OPEN}\n{ctx}\n{CONTEXT_CLOSE}\n\n{main}"),
        None => main.to_string(),
    }
}

/// Aggregate view of the elements that start inside a chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutMetadata {
    pub element_counts: BTreeMap<String, usize>,
    pub layout_confidence: f64,
    pub has_formulas: bool,
}

/// A chunk annotated with the structural elements it contains
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutChunk {
    pub chunk: Chunk,
    pub layout_elements: Vec<LayoutElement>,
    pub structure_type: ElementType,
    pub layout_metadata: LayoutMetadata,
}

impl LayoutChunk {
    /// Annotates `chunk` with `elements`, computing the summary fields
    pub fn new(chunk: Chunk, elements: Vec<LayoutElement>) -> Self {
        let structure_type = dominant_type(&elements);

        let mut element_counts = BTreeMap::new();
        for element in &elements {
            *element_counts
                .entry(element.element_type().as_str().to_string())
                .or_insert(0) += 1;
        }
        let layout_confidence = if elements.is_empty() {
            0.0
        } else {
            elements.iter().map(|e| e.confidence).sum::<f64>() / elements.len() as f64
        };
        let has_formulas = elements
            .iter()
            .any(|e| e.element_type() == ElementType::Formula);

        Self {
            chunk,
            layout_elements: elements,
            structure_type,
            layout_metadata: LayoutMetadata {
                element_counts,
                layout_confidence,
                has_formulas,
            },
        }
    }
}

impl AsRef<Chunk> for LayoutChunk {
    fn as_ref(&self) -> &Chunk {
        &self.chunk
    }
}

/// Most frequent element type; ties go to the type seen first
fn dominant_type(elements: &[LayoutElement]) -> ElementType {
    let mut tally: Vec<(ElementType, usize)> = Vec::new();
    for element in elements {
        let kind = element.element_type();
        match tally.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += 1,
            None => tally.push((kind, 1)),
        }
    }
    let mut best: Option<(ElementType, usize)> = None;
    for (kind, count) in tally {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((kind, count));
        }
    }
    best.map_or(ElementType::Paragraph, |(kind, _)| kind)
}
