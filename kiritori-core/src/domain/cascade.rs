//! Ordered boundary patterns used to pick cut points
//!
//! The cascade is a priority table: the first pattern that matches anything
//! inside a search window wins, and its last match inside the window gives
//! the cut offset. Structural breaks therefore beat sentence ends, which beat
//! clause separators, which beat bare whitespace.

use regex::Regex;
use serde::Serialize;

/// Built-in boundary categories, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Two or more blank lines
    SectionBreak,
    /// A single blank line (double newline)
    ParagraphBreak,
    /// Latin `.!?` followed by whitespace, or CJK `。！？`
    SentenceTerminator,
    /// CJK `，；` or Latin `,` `;` followed by whitespace
    ClauseSeparator,
    /// Any whitespace run
    Whitespace,
}

impl BoundaryKind {
    /// All built-in kinds in cascade order
    pub const ALL: [BoundaryKind; 5] = [
        BoundaryKind::SectionBreak,
        BoundaryKind::ParagraphBreak,
        BoundaryKind::SentenceTerminator,
        BoundaryKind::ClauseSeparator,
        BoundaryKind::Whitespace,
    ];

    /// Stable name used in logs and custom cascades
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryKind::SectionBreak => "section_break",
            BoundaryKind::ParagraphBreak => "paragraph_break",
            BoundaryKind::SentenceTerminator => "sentence_terminator",
            BoundaryKind::ClauseSeparator => "clause_separator",
            BoundaryKind::Whitespace => "whitespace",
        }
    }

    /// Regular expression implementing this boundary
    pub fn pattern(&self) -> &'static str {
        match self {
            BoundaryKind::SectionBreak => r"\r?\n[ \t]*\r?\n[ \t]*\r?\n\s*",
            BoundaryKind::ParagraphBreak => r"\r?\n[ \t]*\r?\n\s*",
            BoundaryKind::SentenceTerminator => {
                r#"[.!?]+["'”’)\]]*\s+|[。！？]+[」』）”’]*\s*"#
            }
            BoundaryKind::ClauseSeparator => r"[，；]\s*|[,;]\s+",
            BoundaryKind::Whitespace => r"\s+",
        }
    }
}

/// A single named pattern in the cascade
#[derive(Debug, Clone)]
pub struct BoundaryPattern {
    name: String,
    regex: Regex,
}

impl BoundaryPattern {
    /// Compiles a named boundary pattern
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }

    /// Pattern name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// End offset (relative to `haystack`) of the last non-empty match
    fn last_match_end(&self, haystack: &str) -> Option<usize> {
        self.regex
            .find_iter(haystack)
            .filter(|m| !m.is_empty())
            .last()
            .map(|m| m.end())
    }
}

/// Outcome of a cascade search over one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    /// A pattern matched; `offset` is absolute, `pattern` indexes the cascade
    Found { offset: usize, pattern: usize },
    /// No pattern matched anything in the window
    NoMatch,
}

/// Ordered list of boundary patterns
#[derive(Debug, Clone)]
pub struct PatternCascade {
    patterns: Vec<BoundaryPattern>,
}

impl PatternCascade {
    /// Builds a cascade from `(name, regex)` pairs, highest priority first
    pub fn from_patterns<I, N, P>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|(name, pattern)| BoundaryPattern::new(name, pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when the cascade holds no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Name of the pattern at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.patterns.get(index).map(BoundaryPattern::name)
    }

    /// Searches `text[window_start..window_end]`.
    ///
    /// Both bounds must be character boundaries. Returned offsets are
    /// absolute and always lie in `(window_start, window_end]`.
    pub fn search(&self, text: &str, window_start: usize, window_end: usize) -> PatternMatch {
        if window_start >= window_end {
            return PatternMatch::NoMatch;
        }
        let window = &text[window_start..window_end];

        for (index, pattern) in self.patterns.iter().enumerate() {
            if let Some(end) = pattern.last_match_end(window) {
                return PatternMatch::Found {
                    offset: window_start + end,
                    pattern: index,
                };
            }
        }

        PatternMatch::NoMatch
    }
}

impl Default for PatternCascade {
    fn default() -> Self {
        let patterns = BoundaryKind::ALL
            .iter()
            .map(|kind| BoundaryPattern {
                name: kind.name().to_string(),
                regex: Regex::new(kind.pattern()).expect("built-in boundary pattern is valid"),
            })
            .collect();
        Self { patterns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_all(cascade: &PatternCascade, text: &str) -> PatternMatch {
        cascade.search(text, 0, text.len())
    }

    #[test]
    fn test_default_cascade_order() {
        let cascade = PatternCascade::default();
        assert_eq!(cascade.len(), 5);
        for (i, kind) in BoundaryKind::ALL.iter().enumerate() {
            assert_eq!(cascade.name(i), Some(kind.name()));
        }
    }

    #[test]
    fn test_paragraph_break_beats_sentence_terminator() {
        let cascade = PatternCascade::default();
        let text = "First paragraph.\n\nSecond one. Third sentence. More";
        match search_all(&cascade, text) {
            PatternMatch::Found { offset, pattern } => {
                assert_eq!(cascade.name(pattern), Some("paragraph_break"));
                assert_eq!(&text[offset..offset + 6], "Second");
            }
            PatternMatch::NoMatch => panic!("expected a paragraph break"),
        }
    }

    #[test]
    fn test_section_break_beats_paragraph_break() {
        let cascade = PatternCascade::default();
        let text = "Intro\n\n\nBody one\n\nBody two";
        match search_all(&cascade, text) {
            PatternMatch::Found { offset, pattern } => {
                assert_eq!(cascade.name(pattern), Some("section_break"));
                assert!(text[offset..].starts_with("Body one"));
            }
            PatternMatch::NoMatch => panic!("expected a section break"),
        }
    }

    #[test]
    fn test_last_sentence_terminator_wins() {
        let cascade = PatternCascade::default();
        let text = "A. B. C";
        assert_eq!(
            search_all(&cascade, text),
            PatternMatch::Found {
                offset: 6,
                pattern: 2
            }
        );
    }

    #[test]
    fn test_cjk_terminator_without_space() {
        let cascade = PatternCascade::default();
        let text = "今日は晴れ。明日は雨";
        match search_all(&cascade, text) {
            PatternMatch::Found { offset, pattern } => {
                assert_eq!(cascade.name(pattern), Some("sentence_terminator"));
                assert_eq!(&text[..offset], "今日は晴れ。");
            }
            PatternMatch::NoMatch => panic!("expected a CJK terminator"),
        }
    }

    #[test]
    fn test_clause_separator_before_whitespace() {
        let cascade = PatternCascade::default();
        let text = "one, two three";
        match search_all(&cascade, text) {
            PatternMatch::Found { offset, pattern } => {
                assert_eq!(cascade.name(pattern), Some("clause_separator"));
                assert_eq!(offset, 5);
            }
            PatternMatch::NoMatch => panic!("expected a clause separator"),
        }
    }

    #[test]
    fn test_decimal_point_is_not_a_terminator() {
        let cascade = PatternCascade::default();
        let text = "pi is 3.14 roughly";
        match search_all(&cascade, text) {
            PatternMatch::Found { pattern, .. } => {
                assert_eq!(cascade.name(pattern), Some("whitespace"));
            }
            PatternMatch::NoMatch => panic!("expected whitespace"),
        }
    }

    #[test]
    fn test_no_match_in_solid_text() {
        let cascade = PatternCascade::default();
        assert_eq!(search_all(&cascade, "abcdefghij"), PatternMatch::NoMatch);
        assert_eq!(cascade.search("abc", 2, 2), PatternMatch::NoMatch);
    }

    #[test]
    fn test_window_offsets_are_absolute() {
        let cascade = PatternCascade::default();
        let text = "xx. yy. zz";
        assert_eq!(
            cascade.search(text, 3, text.len()),
            PatternMatch::Found {
                offset: 8,
                pattern: 2
            }
        );
    }

    #[test]
    fn test_custom_cascade() {
        let cascade = PatternCascade::from_patterns([("pipe", r"\|"), ("space", r" ")]).unwrap();
        assert_eq!(
            cascade.search("a b|c d", 0, 7),
            PatternMatch::Found {
                offset: 4,
                pattern: 0
            }
        );
        assert!(PatternCascade::from_patterns([("bad", "(")]).is_err());
    }
}
