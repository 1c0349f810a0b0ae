//! Cut-point resolution over the pattern cascade

use std::collections::HashMap;

use super::cascade::{PatternCascade, PatternMatch};
use super::text::{ceil_char_boundary, floor_char_boundary};

/// Default trailing search window in bytes
pub const DEFAULT_SEARCH_WINDOW: usize = 400;

/// Which rule produced a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// The text ended inside the window
    EndOfText,
    /// A cascade pattern matched; the value indexes the cascade
    Pattern(usize),
    /// Backward whitespace scan
    Whitespace,
    /// No boundary found; cut at the window end
    Hard,
    /// Moved to the end of a structural element
    Structure,
    /// Moved off a formula placeholder
    Placeholder,
}

/// A resolved cut offset and the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutPoint {
    pub offset: usize,
    pub kind: CutKind,
}

/// Call-scoped memo of cascade results keyed by `(window_start, window_end)`
///
/// Created fresh for every chunking call and dropped when the call returns.
#[derive(Debug, Default)]
pub struct WindowCache {
    entries: HashMap<(usize, usize), PatternMatch>,
    hits: usize,
    misses: usize,
}

impl WindowCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_search(
        &mut self,
        cascade: &PatternCascade,
        text: &str,
        window_start: usize,
        window_end: usize,
    ) -> PatternMatch {
        if let Some(found) = self.entries.get(&(window_start, window_end)) {
            self.hits += 1;
            return *found;
        }
        self.misses += 1;
        let found = cascade.search(text, window_start, window_end);
        self.entries.insert((window_start, window_end), found);
        found
    }

    /// Number of distinct windows searched
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

/// Finds the best cut inside `[start, max_end)` using the cascade
#[derive(Debug, Clone)]
pub struct CutPointResolver {
    cascade: PatternCascade,
    search_window: usize,
    max_chunk_size: usize,
}

impl CutPointResolver {
    pub fn new(cascade: PatternCascade, search_window: usize, max_chunk_size: usize) -> Self {
        Self {
            cascade,
            search_window,
            max_chunk_size,
        }
    }

    /// The cascade in use
    pub fn cascade(&self) -> &PatternCascade {
        &self.cascade
    }

    /// Resolves a cut without memoization
    pub fn find_cut(&self, text: &str, start: usize, max_end: usize) -> usize {
        self.resolve(text, start, max_end, &mut WindowCache::new())
            .offset
    }

    /// Resolves a cut, reusing window results from `cache`.
    ///
    /// The returned offset satisfies `start < offset <= max_end` (after
    /// `max_end` is aligned to a character boundary) and always lies on a
    /// character boundary.
    pub fn resolve(
        &self,
        text: &str,
        start: usize,
        max_end: usize,
        cache: &mut WindowCache,
    ) -> CutPoint {
        if max_end >= text.len() {
            return CutPoint {
                offset: text.len(),
                kind: CutKind::EndOfText,
            };
        }
        debug_assert!(start < max_end, "cut window must not be empty");

        let max_end = align_window_end(text, start, max_end);
        if max_end >= text.len() {
            return CutPoint {
                offset: text.len(),
                kind: CutKind::EndOfText,
            };
        }

        let window_start =
            ceil_char_boundary(text, max_end.saturating_sub(self.search_window).max(start));

        if let PatternMatch::Found { offset, pattern } =
            cache.get_or_search(&self.cascade, text, window_start, max_end)
        {
            if offset > start {
                return CutPoint {
                    offset,
                    kind: CutKind::Pattern(pattern),
                };
            }
        }

        if let Some(offset) = self.last_whitespace(text, start, max_end) {
            return CutPoint {
                offset,
                kind: CutKind::Whitespace,
            };
        }

        CutPoint {
            offset: max_end,
            kind: CutKind::Hard,
        }
    }

    /// Offset just after the last whitespace character located strictly
    /// after `start + max_chunk_size / 2` and before `max_end`
    fn last_whitespace(&self, text: &str, start: usize, max_end: usize) -> Option<usize> {
        let floor = ceil_char_boundary(text, start + self.max_chunk_size / 2 + 1);
        if floor >= max_end {
            return None;
        }
        text[floor..max_end]
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map(|(i, ch)| floor + i + ch.len_utf8())
    }
}

/// Aligns `max_end` to a character boundary without giving up progress
fn align_window_end(text: &str, start: usize, max_end: usize) -> usize {
    let floored = floor_char_boundary(text, max_end);
    if floored > start {
        floored
    } else {
        ceil_char_boundary(text, start + 1)
    }
}
