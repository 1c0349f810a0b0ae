//! Materializes chunk values from resolved spans

use crate::domain::chunk::{decorate, Chunk, ChunkMetadata, LayoutChunk};
use crate::domain::formula::{PlaceholderMap, RestoreFormat};
use crate::domain::layout::LayoutElement;
use crate::domain::text::{ceil_char_boundary, word_count};
use crate::error::ChunkingWarning;

/// A resolved `[start, end)` span of the substituted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub chunk_id: usize,
    pub start: usize,
    pub end: usize,
}

/// A chunk plus what its placeholder restoration reported
#[derive(Debug, Clone)]
pub struct Built<T> {
    pub chunk: T,
    pub warnings: Vec<ChunkingWarning>,
    /// Placeholder entries restored into this chunk
    pub resolved: Vec<usize>,
}

/// Builds chunks for one chunking call
///
/// Every build is a pure function of the span, so a builder can be shared
/// across worker threads.
#[derive(Debug, Clone, Copy)]
pub struct ChunkBuilder<'a> {
    original: &'a str,
    substituted: &'a str,
    placeholders: &'a PlaceholderMap,
    overlap_size: usize,
    format: RestoreFormat,
}

impl<'a> ChunkBuilder<'a> {
    pub fn new(
        original: &'a str,
        substituted: &'a str,
        placeholders: &'a PlaceholderMap,
        overlap_size: usize,
        format: RestoreFormat,
    ) -> Self {
        Self {
            original,
            substituted,
            placeholders,
            overlap_size,
            format,
        }
    }

    /// Builds the plain chunk for `span`
    pub fn build_chunk(&self, span: ChunkSpan) -> Built<Chunk> {
        let restored = self
            .placeholders
            .restore(&self.substituted[span.start..span.end], self.format);
        let main_content = restored.text;

        let original_start = self.placeholders.to_original_offset(span.start);
        let original_end = self.placeholders.to_original_offset(span.end);
        let context = self.context_before(span.chunk_id, original_start);

        let metadata = ChunkMetadata {
            chunk_id: span.chunk_id,
            start_pos: span.start,
            end_pos: span.end,
            word_count: word_count(&main_content),
            char_count: main_content.chars().count(),
            has_context: context.is_some(),
            original_start,
            original_end,
        };

        Built {
            chunk: Chunk {
                chunk_id: span.chunk_id,
                text: decorate(&main_content, context.as_deref()),
                main_content,
                metadata,
                context,
            },
            warnings: restored.warnings,
            resolved: restored.resolved,
        }
    }

    /// Builds the chunk for `span` annotated with the elements starting in it.
    ///
    /// `elements` must be sorted by start offset.
    pub fn build_layout_chunk(&self, span: ChunkSpan, elements: &[LayoutElement]) -> Built<LayoutChunk> {
        let Built {
            chunk,
            warnings,
            resolved,
        } = self.build_chunk(span);

        let from = elements.partition_point(|e| e.start() < span.start);
        let to = elements.partition_point(|e| e.start() < span.end);
        let contained = elements[from..to].to_vec();

        Built {
            chunk: LayoutChunk::new(chunk, contained),
            warnings,
            resolved,
        }
    }

    /// Up to `overlap_size` bytes of original text ending at `original_start`
    fn context_before(&self, chunk_id: usize, original_start: usize) -> Option<String> {
        if chunk_id == 0 || self.overlap_size == 0 {
            return None;
        }
        let start = ceil_char_boundary(self.original, original_start.saturating_sub(self.overlap_size));
        let context = &self.original[start..original_start];
        (!context.is_empty()).then(|| context.to_string())
    }
}
