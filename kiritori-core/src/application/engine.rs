//! The chunking engine
//!
//! One call runs: formula substitution, structure detection, the sequential
//! cut scan, then chunk materialization with per-chunk formula restoration.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::builder::{Built, ChunkBuilder, ChunkSpan};
use crate::application::cancel::CancellationToken;
use crate::application::config::ChunkerConfig;
use crate::application::diagnostics::{DiagnosticSink, LogSink};
use crate::application::parallel::ChunkMaterializer;
use crate::domain::cascade::PatternCascade;
use crate::domain::chunk::{Chunk, LayoutChunk};
use crate::domain::cut::{CutPointResolver, WindowCache};
use crate::domain::formula::{substitute, FormulaDetector, PlaceholderMap};
use crate::domain::layout::{LayoutDetector, LayoutElement};
use crate::domain::structure_cut::StructureAwareResolver;
use crate::domain::text::ceil_char_boundary;
use crate::error::{ChunkingError, ChunkingWarning, Result};

/// Chunks produced by one call, plus every non-fatal warning raised
#[derive(Debug, Clone)]
pub struct ChunkingOutput<T> {
    pub chunks: Vec<T>,
    pub warnings: Vec<ChunkingWarning>,
}

impl<T: AsRef<Chunk>> ChunkingOutput<T> {
    /// Concatenation of every chunk's `main_content`
    pub fn reconstruct(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.as_ref().main_content.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Per-call working state shared by both chunk flavours
struct Prepared<'a> {
    substituted: Cow<'a, str>,
    placeholders: PlaceholderMap,
    elements: Vec<LayoutElement>,
    spans: Vec<ChunkSpan>,
    warnings: Vec<ChunkingWarning>,
}

/// Splits documents into bounded, structure-aware chunks
///
/// The engine holds only immutable configuration; every call creates its own
/// working state, so one engine can serve concurrent callers.
pub struct ChunkingEngine {
    config: ChunkerConfig,
    resolver: StructureAwareResolver,
    formulas: FormulaDetector,
    layout: LayoutDetector,
    materializer: ChunkMaterializer,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ChunkingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkingEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChunkingEngine {
    /// Creates an engine that reports diagnostics through the `log` facade
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Creates an engine that reports diagnostics to `sink`
    pub fn with_sink(config: ChunkerConfig, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        config.validate()?;

        let resolver = StructureAwareResolver::new(CutPointResolver::new(
            PatternCascade::default(),
            config.search_window,
            config.max_chunk_size,
        ));

        Ok(Self {
            resolver,
            formulas: FormulaDetector::new(config.priors),
            layout: LayoutDetector::new(config.layout_options(), config.priors),
            materializer: ChunkMaterializer::new(config.threads, config.parallel_threshold),
            sink,
            config,
        })
    }

    /// Replaces the boundary cascade
    pub fn with_cascade(mut self, cascade: PatternCascade) -> Self {
        self.resolver = StructureAwareResolver::new(CutPointResolver::new(
            cascade,
            self.config.search_window,
            self.config.max_chunk_size,
        ));
        self
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Splits `text` into plain chunks
    pub fn chunk_document(&self, text: &str) -> Result<ChunkingOutput<Chunk>> {
        self.run_plain(text, None)
    }

    /// Like [`chunk_document`](Self::chunk_document), aborting when `token` is cancelled
    pub fn chunk_document_cancellable(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<ChunkingOutput<Chunk>> {
        self.run_plain(text, Some(token))
    }

    /// Splits `text` into chunks annotated with their structural elements
    pub fn chunk_document_with_layout(&self, text: &str) -> Result<ChunkingOutput<LayoutChunk>> {
        self.run_layout(text, None)
    }

    /// Like [`chunk_document_with_layout`](Self::chunk_document_with_layout),
    /// aborting when `token` is cancelled
    pub fn chunk_document_with_layout_cancellable(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<ChunkingOutput<LayoutChunk>> {
        self.run_layout(text, Some(token))
    }

    fn run_plain(
        &self,
        text: &str,
        token: Option<&CancellationToken>,
    ) -> Result<ChunkingOutput<Chunk>> {
        let prepared = self.prepare(text, token, false)?;
        let builder = self.builder(text, &prepared);
        let built = self
            .materializer
            .map(prepared.spans.clone(), |span| builder.build_chunk(span));
        Ok(self.finish(&prepared, built))
    }

    fn run_layout(
        &self,
        text: &str,
        token: Option<&CancellationToken>,
    ) -> Result<ChunkingOutput<LayoutChunk>> {
        let prepared = self.prepare(text, token, true)?;
        let builder = self.builder(text, &prepared);
        let elements = prepared.elements.as_slice();
        let built = self.materializer.map(prepared.spans.clone(), |span| {
            builder.build_layout_chunk(span, elements)
        });
        Ok(self.finish(&prepared, built))
    }

    fn builder<'a>(&self, text: &'a str, prepared: &'a Prepared<'_>) -> ChunkBuilder<'a> {
        ChunkBuilder::new(
            text,
            &prepared.substituted,
            &prepared.placeholders,
            self.config.overlap_size,
            self.config.formula_format,
        )
    }

    fn prepare<'a>(
        &self,
        text: &'a str,
        token: Option<&CancellationToken>,
        with_layout: bool,
    ) -> Result<Prepared<'a>> {
        if text.is_empty() {
            return Err(ChunkingError::InvalidInput {
                reason: "text is empty".to_string(),
            });
        }

        // Sized against the caller's text: tokens may be longer than formulas
        let single = text.len() <= self.config.max_chunk_size;
        let needs_structure = with_layout || !single;
        let mut warnings = Vec::new();

        let (substituted, placeholders) = if self.config.handle_formulas && needs_structure {
            let scan = self.formulas.detect(text);
            warnings.extend(scan.warnings);
            if scan.formulas.is_empty() {
                (Cow::Borrowed(text), PlaceholderMap::empty())
            } else {
                let (substituted, map) = substitute(text, &scan.formulas);
                self.sink.debug(format_args!(
                    "substituted {} formulas with {}n] tokens",
                    map.len(),
                    map.opener()
                ));
                (Cow::Owned(substituted), map)
            }
        } else {
            (Cow::Borrowed(text), PlaceholderMap::empty())
        };

        let elements = if needs_structure {
            self.layout.detect(&substituted, &placeholders)
        } else {
            Vec::new()
        };

        let spans = if single {
            vec![ChunkSpan {
                chunk_id: 0,
                start: 0,
                end: substituted.len(),
            }]
        } else {
            self.scan(&substituted, &elements, &placeholders, token)?
        };

        Ok(Prepared {
            substituted,
            placeholders,
            elements,
            spans,
            warnings,
        })
    }

    /// Resolves every cut point in order
    fn scan(
        &self,
        text: &str,
        elements: &[LayoutElement],
        placeholders: &PlaceholderMap,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<ChunkSpan>> {
        let mut cache = WindowCache::new();
        let mut spans = Vec::new();
        let mut current = 0;
        // Cuts only advance, so elements ending before `current` are done
        let mut live = 0;

        while current < text.len() {
            if token.is_some_and(CancellationToken::is_cancelled) {
                return Err(ChunkingError::Cancelled {
                    chunks_resolved: spans.len(),
                });
            }

            while elements.get(live).is_some_and(|e| e.end() <= current) {
                live += 1;
            }

            let max_end = current.saturating_add(self.config.max_chunk_size);
            let cut = self.resolver.resolve(
                text,
                current,
                max_end,
                &elements[live..],
                Some(placeholders),
                &mut cache,
            );
            let end = if cut.offset > current {
                cut.offset
            } else {
                ceil_char_boundary(text, current + 1)
            };

            self.sink.debug(format_args!(
                "chunk {} spans {}..{} ({:?})",
                spans.len(),
                current,
                end,
                cut.kind
            ));
            spans.push(ChunkSpan {
                chunk_id: spans.len(),
                start: current,
                end,
            });
            current = end;
        }

        let (hits, misses) = cache.stats();
        self.sink.debug(format_args!(
            "resolved {} cuts; window cache {hits} hits, {misses} misses",
            spans.len()
        ));
        Ok(spans)
    }

    fn finish<T>(&self, prepared: &Prepared<'_>, built: Vec<Built<T>>) -> ChunkingOutput<T> {
        let mut warnings = prepared.warnings.clone();
        let mut resolved = BTreeSet::new();
        let mut chunks = Vec::with_capacity(built.len());

        for item in built {
            warnings.extend(item.warnings);
            resolved.extend(item.resolved);
            chunks.push(item.chunk);
        }
        warnings.extend(prepared.placeholders.unresolved(&resolved));

        for warning in &warnings {
            self.sink.warning(warning);
        }

        ChunkingOutput { chunks, warnings }
    }
}
