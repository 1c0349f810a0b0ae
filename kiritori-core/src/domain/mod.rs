//! Domain layer for structure-aware chunking
//!
//! Pure algorithms with no I/O: the boundary pattern cascade, cut-point
//! resolution, formula detection and placeholder substitution, structural
//! element detection and the chunk value objects they produce.

pub mod cascade;
pub mod chunk;
pub mod cut;
pub mod formula;
pub mod layout;
pub mod priors;
pub mod structure_cut;
pub mod text;

pub use cascade::{BoundaryKind, BoundaryPattern, PatternCascade, PatternMatch};
pub use chunk::{Chunk, ChunkMetadata, LayoutChunk, LayoutMetadata, CONTEXT_CLOSE, CONTEXT_OPEN};
pub use cut::{CutKind, CutPoint, CutPointResolver, WindowCache, DEFAULT_SEARCH_WINDOW};
pub use formula::{
    substitute, Formula, FormulaDetails, FormulaDetector, FormulaKind, PlaceholderMap,
    RestoreFormat,
};
pub use layout::{
    ElementMetadata, ElementType, HeadingStyle, LayoutDetector, LayoutElement, LayoutOptions,
    ListMarker,
};
pub use priors::ConfidencePriors;
pub use structure_cut::StructureAwareResolver;
