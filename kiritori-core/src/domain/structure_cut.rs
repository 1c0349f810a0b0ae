//! Cut resolution that avoids bisecting structural elements

use super::cut::{CutKind, CutPoint, CutPointResolver, WindowCache};
use super::formula::PlaceholderMap;
use super::layout::LayoutElement;

/// Wraps [`CutPointResolver`] and moves naive cuts off containable elements
#[derive(Debug, Clone)]
pub struct StructureAwareResolver {
    inner: CutPointResolver,
}

impl StructureAwareResolver {
    pub fn new(inner: CutPointResolver) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &CutPointResolver {
        &self.inner
    }

    /// Resolves a cut with no placeholder guard and a throwaway cache
    pub fn find_cut(
        &self,
        text: &str,
        start: usize,
        max_end: usize,
        elements: &[LayoutElement],
    ) -> usize {
        self.resolve(text, start, max_end, elements, None, &mut WindowCache::new())
            .offset
    }

    /// Resolves a cut inside `[start, max_end)`.
    ///
    /// `elements` must be sorted by start offset. When the naive cut lands
    /// strictly inside elements that end at or before `max_end`, the cut
    /// moves to the latest such end. Elements reaching past `max_end` are
    /// not protected. A cut that still falls inside a placeholder token is
    /// moved to the token start, or to its end when the start would not
    /// make progress.
    pub fn resolve(
        &self,
        text: &str,
        start: usize,
        max_end: usize,
        elements: &[LayoutElement],
        placeholders: Option<&PlaceholderMap>,
        cache: &mut WindowCache,
    ) -> CutPoint {
        let naive = self.inner.resolve(text, start, max_end, cache);
        if naive.kind == CutKind::EndOfText {
            return naive;
        }

        let cut = match containing_end(elements, start, naive.offset, max_end) {
            Some(end) => CutPoint {
                offset: end,
                kind: CutKind::Structure,
            },
            None => naive,
        };

        match placeholders.and_then(|map| map.token_containing(cut.offset)) {
            Some((token_start, _)) if token_start > start => CutPoint {
                offset: token_start,
                kind: CutKind::Placeholder,
            },
            Some((_, token_end)) => CutPoint {
                offset: token_end,
                kind: CutKind::Placeholder,
            },
            None => cut,
        }
    }
}

/// Latest end among elements split by `cut` that fit before `max_end`
fn containing_end(
    elements: &[LayoutElement],
    start: usize,
    cut: usize,
    max_end: usize,
) -> Option<usize> {
    let candidates = elements.partition_point(|e| e.start() < cut);
    elements[..candidates]
        .iter()
        .filter(|e| e.overlaps(start, max_end) && e.is_split_by(cut) && e.end() <= max_end)
        .map(LayoutElement::end)
        .max()
}
