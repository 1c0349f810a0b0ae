//! Lossless placeholder substitution for formulas
//!
//! Formulas are swapped for short opaque tokens before boundary search so
//! cut patterns never fire inside them, then swapped back per chunk.

use std::borrow::Cow;
use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::{Formula, FormulaDetails};
use crate::error::ChunkingWarning;

const TOKEN_STEM: &str = "FORMULA";

/// Representation used when placeholders are restored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreFormat {
    /// The exact source text; keeps reconstruction lossless
    #[default]
    Original,
    Latex,
    Mathml,
}

impl RestoreFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreFormat::Original => "original",
            RestoreFormat::Latex => "latex",
            RestoreFormat::Mathml => "mathml",
        }
    }
}

impl std::str::FromStr for RestoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(RestoreFormat::Original),
            "latex" => Ok(RestoreFormat::Latex),
            "mathml" => Ok(RestoreFormat::Mathml),
            other => Err(format!(
                "unknown formula format '{other}' (expected original, latex or mathml)"
            )),
        }
    }
}

/// One token and the formula it stands for
#[derive(Debug, Clone)]
pub struct PlaceholderEntry {
    token: String,
    span: (usize, usize),
    formula: Formula,
}

impl PlaceholderEntry {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Byte span of the token in the substituted text
    pub fn span(&self) -> (usize, usize) {
        self.span
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    fn render(&self, format: RestoreFormat) -> Cow<'_, str> {
        let formula = &self.formula;
        match format {
            RestoreFormat::Original => Cow::Borrowed(&formula.original_text),
            RestoreFormat::Mathml => Cow::Borrowed(&formula.mathml_repr),
            RestoreFormat::Latex => match formula.metadata {
                FormulaDetails::Math { display: true } => {
                    Cow::Owned(format!("$${}$$", formula.latex_repr))
                }
                _ => Cow::Owned(format!("${}$", formula.latex_repr)),
            },
        }
    }
}

/// Result of restoring placeholders in one piece of text
#[derive(Debug, Clone, Default)]
pub struct Restored {
    pub text: String,
    pub warnings: Vec<ChunkingWarning>,
    /// Indices of the entries whose tokens were replaced
    pub resolved: Vec<usize>,
}

/// Token to formula association for one chunking call
#[derive(Debug, Clone)]
pub struct PlaceholderMap {
    opener: String,
    entries: Vec<PlaceholderEntry>,
    pattern: Regex,
}

impl PlaceholderMap {
    /// A map with no entries; restoration is the identity
    pub fn empty() -> Self {
        Self::with_opener(token_opener(1), Vec::new())
    }

    fn with_opener(opener: String, entries: Vec<PlaceholderEntry>) -> Self {
        let pattern = Regex::new(&format!(r"{}(\d+)\]", regex::escape(&opener)))
            .expect("escaped placeholder pattern is valid");
        Self {
            opener,
            entries,
            pattern,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in substituted-text order
    pub fn iter(&self) -> impl Iterator<Item = &PlaceholderEntry> {
        self.entries.iter()
    }

    /// Token opener in use, e.g. `[FORMULA_` or `[FORMULA2_`
    pub fn opener(&self) -> &str {
        &self.opener
    }

    /// Span of the token strictly containing `pos`, if any
    pub fn token_containing(&self, pos: usize) -> Option<(usize, usize)> {
        self.entry_before(pos)
            .map(PlaceholderEntry::span)
            .filter(|(_, end)| pos < *end)
    }

    /// Last entry whose token starts strictly before `pos`
    fn entry_before(&self, pos: usize) -> Option<&PlaceholderEntry> {
        let idx = self.entries.partition_point(|entry| entry.span.0 < pos);
        idx.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Maps an offset in the substituted text back to the original text.
    ///
    /// Offsets strictly inside a token map to the start of its formula.
    pub fn to_original_offset(&self, pos: usize) -> usize {
        match self.entry_before(pos) {
            None => pos,
            Some(entry) if pos < entry.span.1 => entry.formula.start(),
            Some(entry) => entry.formula.end() + (pos - entry.span.1),
        }
    }

    /// Replaces every token of this map found in `text`.
    ///
    /// An empty map leaves `text` untouched, even when it contains
    /// token-shaped literals.
    pub fn restore(&self, text: &str, format: RestoreFormat) -> Restored {
        if self.entries.is_empty() || !text.contains(self.opener.as_str()) {
            return Restored {
                text: text.to_string(),
                ..Default::default()
            };
        }

        let mut restored = Restored::default();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(index)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let entry = index
                .as_str()
                .parse::<usize>()
                .ok()
                .and_then(|i| self.entries.get(i).map(|entry| (i, entry)));
            let Some((i, entry)) = entry else {
                restored.warnings.push(ChunkingWarning::PlaceholderResolution {
                    token: whole.as_str().to_string(),
                    reason: "token does not match any detected formula".into(),
                });
                continue;
            };

            out.push_str(&text[last..whole.start()]);
            out.push_str(&entry.render(format));
            last = whole.end();
            restored.resolved.push(i);
        }

        out.push_str(&text[last..]);
        restored.text = out;
        restored
    }

    /// Warnings for entries missing from `resolved`
    pub fn unresolved(&self, resolved: &BTreeSet<usize>) -> Vec<ChunkingWarning> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !resolved.contains(i))
            .map(|(_, entry)| ChunkingWarning::PlaceholderResolution {
                token: entry.token.clone(),
                reason: "token never appeared in the restored output".into(),
            })
            .collect()
    }

    /// Restores a complete substituted text and checks every entry was used
    pub fn restore_all(&self, text: &str, format: RestoreFormat) -> Restored {
        let mut restored = self.restore(text, format);
        let resolved: BTreeSet<usize> = restored.resolved.iter().copied().collect();
        restored.warnings.extend(self.unresolved(&resolved));
        restored
    }
}

impl Default for PlaceholderMap {
    fn default() -> Self {
        Self::empty()
    }
}

fn token_opener(generation: usize) -> String {
    if generation <= 1 {
        format!("[{TOKEN_STEM}_")
    } else {
        format!("[{TOKEN_STEM}{generation}_")
    }
}

/// Swaps each formula span for a placeholder token.
///
/// `formulas` must carry disjoint spans on character boundaries of `text`;
/// spans that violate this are left in place. Restoring the result with
/// [`RestoreFormat::Original`] yields `text` again.
pub fn substitute(text: &str, formulas: &[Formula]) -> (String, PlaceholderMap) {
    let mut generation = 1;
    while text.contains(token_opener(generation).as_str()) {
        generation += 1;
    }
    let opener = token_opener(generation);

    let mut ordered: Vec<&Formula> = formulas.iter().collect();
    ordered.sort_by_key(|f| f.start());

    let mut accepted: Vec<&Formula> = Vec::with_capacity(ordered.len());
    for formula in ordered {
        let (start, end) = formula.position;
        let in_bounds = start < end
            && end <= text.len()
            && text.is_char_boundary(start)
            && text.is_char_boundary(end);
        let disjoint = accepted.last().map_or(true, |prev| prev.end() <= start);
        if in_bounds && disjoint {
            accepted.push(formula);
        } else {
            log::debug!("skipping formula span {start}..{end}: overlapping or out of bounds");
        }
    }

    // Splice from the highest offset down so earlier spans stay valid
    let mut out = text.to_string();
    for (index, formula) in accepted.iter().enumerate().rev() {
        let token = format!("{opener}{index}]");
        out.replace_range(formula.start()..formula.end(), &token);
    }

    let mut entries = Vec::with_capacity(accepted.len());
    let mut shift: isize = 0;
    for (index, formula) in accepted.into_iter().enumerate() {
        let token = format!("{opener}{index}]");
        let start = formula.start().saturating_add_signed(shift);
        let end = start + token.len();
        shift += token.len() as isize - (formula.end() - formula.start()) as isize;
        entries.push(PlaceholderEntry {
            token,
            span: (start, end),
            formula: formula.clone(),
        });
    }

    (out, PlaceholderMap::with_opener(opener, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formula::FormulaDetector;

    fn substitute_detected(text: &str) -> (String, PlaceholderMap) {
        let scan = FormulaDetector::default().detect(text);
        substitute(text, &scan.formulas)
    }

    #[test]
    fn test_round_trip_original() {
        let text = "Mix H2O with NaCl2, then $x^2 + y$ and $$\\sqrt{z}$$ done.";
        let (substituted, map) = substitute_detected(text);
        assert_eq!(map.len(), 4);
        assert!(substituted.contains("[FORMULA_0]"));
        assert!(!substituted.contains('$'));

        let restored = map.restore_all(&substituted, RestoreFormat::Original);
        assert_eq!(restored.text, text);
        assert!(restored.warnings.is_empty());
    }

    #[test]
    fn test_entry_spans_point_at_tokens() {
        let text = "a $x$ b $yy$ c";
        let (substituted, map) = substitute_detected(text);
        for entry in map.iter() {
            let (start, end) = entry.span();
            assert_eq!(&substituted[start..end], entry.token());
        }
    }

    #[test]
    fn test_generation_bump_when_text_contains_prefix() {
        let text = "Literal [FORMULA_0] and $x$.";
        let (substituted, map) = substitute_detected(text);
        assert_eq!(map.opener(), "[FORMULA2_");
        assert!(substituted.contains("[FORMULA2_0]"));

        let restored = map.restore_all(&substituted, RestoreFormat::Original);
        assert_eq!(restored.text, text);
        assert!(restored.warnings.is_empty());
    }

    #[test]
    fn test_unknown_token_is_kept_with_warning() {
        let (_, map) = substitute_detected("only $x$ here");
        let restored = map.restore("stray [FORMULA_7] token", RestoreFormat::Original);
        assert_eq!(restored.text, "stray [FORMULA_7] token");
        assert_eq!(restored.warnings.len(), 1);
    }

    #[test]
    fn test_missing_token_is_reported() {
        let (_, map) = substitute_detected("only $x$ here");
        let restored = map.restore_all("token was lost", RestoreFormat::Original);
        assert_eq!(restored.text, "token was lost");
        assert!(matches!(
            restored.warnings.as_slice(),
            [ChunkingWarning::PlaceholderResolution { token, .. }] if token == "[FORMULA_0]"
        ));
    }

    #[test]
    fn test_restore_latex_and_mathml() {
        let (substituted, map) = substitute_detected("see $x^2$ now");
        let latex = map.restore(&substituted, RestoreFormat::Latex);
        assert_eq!(latex.text, "see $x^2$ now");
        let mathml = map.restore(&substituted, RestoreFormat::Mathml);
        assert!(mathml.text.contains("<msup><mi>x</mi><mn>2</mn></msup>"));
    }

    #[test]
    fn test_to_original_offset() {
        let text = "ab $xyz_{long}$ cd";
        let (substituted, map) = substitute_detected(text);
        let (start, end) = map.iter().next().unwrap().span();
        assert_eq!(map.to_original_offset(0), 0);
        assert_eq!(map.to_original_offset(start), 3);
        assert_eq!(map.to_original_offset(start + 2), 3);
        assert_eq!(map.to_original_offset(end), 15);
        assert_eq!(map.to_original_offset(substituted.len()), text.len());
        assert_eq!(map.token_containing(start + 1), Some((start, end)));
        assert_eq!(map.token_containing(start), None);
    }

    #[test]
    fn test_offsets_across_many_tokens() {
        let text = "w $a$ ".repeat(500);
        let (substituted, map) = substitute_detected(&text);
        assert_eq!(map.len(), 500);

        for entry in map.iter() {
            let (start, end) = entry.span();
            let formula = entry.formula();
            assert_eq!(map.token_containing(start + 1), Some((start, end)));
            assert_eq!(map.token_containing(end), None);
            assert_eq!(map.to_original_offset(start), formula.start());
            assert_eq!(map.to_original_offset(end - 1), formula.start());
            assert_eq!(map.to_original_offset(end), formula.end());
            assert_eq!(map.to_original_offset(end + 1), formula.end() + 1);
        }
        assert_eq!(map.to_original_offset(substituted.len()), text.len());
    }

    #[test]
    fn test_empty_map_is_identity() {
        let map = PlaceholderMap::empty();
        let restored = map.restore_all("plain [FORMULA_1] text", RestoreFormat::Original);
        assert_eq!(restored.text, "plain [FORMULA_1] text");
        assert!(restored.warnings.is_empty());
        assert_eq!(map.to_original_offset(5), 5);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("LaTeX".parse::<RestoreFormat>(), Ok(RestoreFormat::Latex));
        assert!("pdf".parse::<RestoreFormat>().is_err());
    }
}
