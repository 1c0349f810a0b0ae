//! Line-oriented structural element detection

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::types::{ElementMetadata, HeadingStyle, LayoutElement, ListMarker};
use crate::domain::formula::{PlaceholderMap, RestoreFormat};
use crate::domain::priors::ConfidencePriors;

/// Maximum gap in bytes between list items that still belong to one list
const LIST_ITEM_GAP: usize = 2;

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+\S").expect("valid heading regex"));

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)+)\.?[ \t]+\p{Lu}").expect("valid numbered heading regex")
});

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[ \t]+\p{Lu}[^.!?]{0,78}$").expect("valid section heading regex")
});

static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)[-*+•][ \t]+\S").expect("valid bullet regex"));

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)\d{1,3}[.)][ \t]+\S").expect("valid numbered item regex"));

static LETTERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)[a-zA-Z][.)][ \t]+\S").expect("valid lettered item regex")
});

static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?[ \t]*:?-{3,}:?[ \t]*(?:\|[ \t]*:?-{3,}:?[ \t]*)*\|?$")
        .expect("valid table separator regex")
});

/// Which element families the detector looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub respect_headings: bool,
    pub preserve_tables: bool,
    pub detect_paragraphs: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            respect_headings: true,
            preserve_tables: true,
            detect_paragraphs: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LineKind {
    Blank,
    Text,
    TableRow { cells: usize, separator: bool },
    Heading { level: u8, style: HeadingStyle },
    ListItem { marker: ListMarker, indent: usize },
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
    kind: LineKind,
}

/// Detects headings, lists, tables, paragraphs and formula tokens
#[derive(Debug, Clone, Default)]
pub struct LayoutDetector {
    options: LayoutOptions,
    priors: ConfidencePriors,
}

impl LayoutDetector {
    pub fn new(options: LayoutOptions, priors: ConfidencePriors) -> Self {
        Self { options, priors }
    }

    /// Detects elements in `text`, sorted by `(start, end)`.
    ///
    /// Formula elements come from `placeholders`; pass an empty map when
    /// formulas are not handled.
    pub fn detect(&self, text: &str, placeholders: &PlaceholderMap) -> Vec<LayoutElement> {
        let lines = self.classify_lines(text);
        let mut elements = Vec::new();

        self.collect_headings(text, &lines, placeholders, &mut elements);
        self.collect_lists(text, &lines, placeholders, &mut elements);
        self.collect_tables(text, &lines, placeholders, &mut elements);
        if self.options.detect_paragraphs {
            self.collect_paragraphs(text, &lines, placeholders, &mut elements);
        }
        for entry in placeholders.iter() {
            let formula = entry.formula();
            elements.push(LayoutElement {
                content: formula.original_text.clone(),
                metadata: ElementMetadata::Formula(formula.clone()),
                position: entry.span(),
                confidence: formula.confidence,
            });
        }

        elements.sort_by_key(|e| (e.start(), e.end()));
        debug!("layout detection found {} elements", elements.len());
        elements
    }

    fn classify_lines(&self, text: &str) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw in text.split_inclusive('\n') {
            let body = raw.trim_end_matches(['\n', '\r']);
            lines.push(Line {
                start: offset,
                end: offset + body.len(),
                kind: self.classify(body),
            });
            offset += raw.len();
        }
        lines
    }

    fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if self.options.preserve_tables {
            if let Some(kind) = table_row(trimmed) {
                return kind;
            }
        }
        if self.options.respect_headings {
            if let Some(kind) = heading(trimmed) {
                return kind;
            }
        }
        list_item(line).unwrap_or(LineKind::Text)
    }

    fn collect_headings(
        &self,
        text: &str,
        lines: &[Line],
        placeholders: &PlaceholderMap,
        out: &mut Vec<LayoutElement>,
    ) {
        for line in lines {
            if let LineKind::Heading { level, style } = line.kind {
                out.push(LayoutElement {
                    content: element_content(text, line.start, line.end, placeholders),
                    metadata: ElementMetadata::Heading { level, style },
                    position: (line.start, line.end),
                    confidence: self.priors.heading,
                });
            }
        }
    }

    fn collect_lists(
        &self,
        text: &str,
        lines: &[Line],
        placeholders: &PlaceholderMap,
        out: &mut Vec<LayoutElement>,
    ) {
        let items: Vec<(Line, ListMarker, usize)> = lines
            .iter()
            .filter_map(|line| match line.kind {
                LineKind::ListItem { marker, indent } => Some((*line, marker, indent)),
                _ => None,
            })
            .collect();

        let mut group: Vec<(Line, ListMarker, usize)> = Vec::new();
        for item in items {
            if let Some((last, _, _)) = group.last() {
                if item.0.start - last.end > LIST_ITEM_GAP {
                    self.flush_list(text, &group, placeholders, out);
                    group.clear();
                }
            }
            group.push(item);
        }
        self.flush_list(text, &group, placeholders, out);
    }

    fn flush_list(
        &self,
        text: &str,
        group: &[(Line, ListMarker, usize)],
        placeholders: &PlaceholderMap,
        out: &mut Vec<LayoutElement>,
    ) {
        let (Some((first, marker, indent)), Some((last, _, _))) = (group.first(), group.last())
        else {
            return;
        };
        let content = element_content(text, first.start, last.end, placeholders);
        let element = if group.len() == 1 {
            LayoutElement {
                content,
                metadata: ElementMetadata::ListItem {
                    marker: *marker,
                    ordered: marker.is_ordered(),
                    indent: *indent,
                },
                position: (first.start, first.end),
                confidence: self.priors.list_item,
            }
        } else {
            LayoutElement {
                content,
                metadata: ElementMetadata::List {
                    item_count: group.len(),
                    ordered: marker.is_ordered(),
                },
                position: (first.start, last.end),
                confidence: self.priors.list,
            }
        };
        out.push(element);
    }

    fn collect_tables(
        &self,
        text: &str,
        lines: &[Line],
        placeholders: &PlaceholderMap,
        out: &mut Vec<LayoutElement>,
    ) {
        let sentinel = Line {
            start: text.len(),
            end: text.len(),
            kind: LineKind::Blank,
        };
        let mut run: Vec<(Line, usize, bool)> = Vec::new();
        for line in lines.iter().chain(std::iter::once(&sentinel)) {
            if let LineKind::TableRow { cells, separator } = line.kind {
                run.push((*line, cells, separator));
                continue;
            }
            if run.len() >= 2 {
                let first = run[0].0;
                let last = run[run.len() - 1].0;
                out.push(LayoutElement {
                    content: element_content(text, first.start, last.end, placeholders),
                    metadata: ElementMetadata::Table {
                        rows: run.iter().filter(|(_, _, sep)| !sep).count(),
                        columns: run.iter().map(|(_, cells, _)| *cells).max().unwrap_or(0),
                        has_header: run[1].2,
                    },
                    position: (first.start, last.end),
                    confidence: self.priors.table,
                });
            }
            run.clear();
        }
    }

    fn collect_paragraphs(
        &self,
        text: &str,
        lines: &[Line],
        placeholders: &PlaceholderMap,
        out: &mut Vec<LayoutElement>,
    ) {
        let mut current: Option<(usize, usize)> = None;
        let flush = |span: Option<(usize, usize)>, out: &mut Vec<LayoutElement>| {
            if let Some((start, end)) = span {
                out.push(LayoutElement {
                    content: element_content(text, start, end, placeholders),
                    metadata: ElementMetadata::Paragraph {},
                    position: (start, end),
                    confidence: self.priors.paragraph,
                });
            }
        };
        for line in lines {
            match line.kind {
                LineKind::Text => {
                    current = Some(match current {
                        Some((start, _)) => (start, line.end),
                        None => (line.start, line.end),
                    });
                }
                _ => flush(current.take(), out),
            }
        }
        flush(current, out);
    }
}

fn element_content(text: &str, start: usize, end: usize, placeholders: &PlaceholderMap) -> String {
    placeholders
        .restore(&text[start..end], RestoreFormat::Original)
        .text
}

fn table_row(trimmed: &str) -> Option<LineKind> {
    let pipes = trimmed.matches('|').count();
    let framed = trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|');
    if !framed && pipes < 2 {
        return None;
    }
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    Some(LineKind::TableRow {
        cells: inner.split('|').count(),
        separator: TABLE_SEPARATOR.is_match(trimmed),
    })
}

fn heading(trimmed: &str) -> Option<LineKind> {
    if let Some(caps) = MARKDOWN_HEADING.captures(trimmed) {
        let level = caps.get(1).map_or(1, |m| m.len()) as u8;
        return Some(LineKind::Heading {
            level,
            style: HeadingStyle::Markdown,
        });
    }
    if let Some(caps) = NUMBERED_HEADING.captures(trimmed) {
        let level = caps.get(1).map_or(1, |m| m.as_str().split('.').count()) as u8;
        return Some(LineKind::Heading {
            level,
            style: HeadingStyle::Numbered,
        });
    }
    if SECTION_HEADING.is_match(trimmed) {
        return Some(LineKind::Heading {
            level: 1,
            style: HeadingStyle::Numbered,
        });
    }
    if is_all_caps(trimmed) {
        return Some(LineKind::Heading {
            level: 1,
            style: HeadingStyle::AllCaps,
        });
    }
    None
}

fn is_all_caps(trimmed: &str) -> bool {
    let length = trimmed.chars().count();
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    (3..=80).contains(&length)
        && letters >= 2
        && trimmed.starts_with(char::is_alphanumeric)
        && !trimmed.contains(['[', ']', '_', '|'])
        && trimmed
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

fn list_item(line: &str) -> Option<LineKind> {
    let candidates = [
        (&*BULLET_ITEM, ListMarker::Bullet),
        (&*NUMBERED_ITEM, ListMarker::Numbered),
        (&*LETTERED_ITEM, ListMarker::Lettered),
    ];
    candidates.into_iter().find_map(|(regex, marker)| {
        regex.captures(line).map(|caps| LineKind::ListItem {
            marker,
            indent: caps.get(1).map_or(0, |m| m.len()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::formula::{substitute, FormulaDetector};
    use crate::domain::layout::ElementType;

    fn detect(text: &str) -> Vec<LayoutElement> {
        LayoutDetector::default().detect(text, &PlaceholderMap::empty())
    }

    fn types(elements: &[LayoutElement]) -> Vec<ElementType> {
        elements.iter().map(LayoutElement::element_type).collect()
    }

    #[test]
    fn test_markdown_and_numbered_headings() {
        let text = "## Overview\nBody text.\n1.2 Scope of work\n3 Results\nINTRODUCTION\n";
        let elements = detect(text);
        assert_eq!(types(&elements), vec![ElementType::Heading; 4]);
        assert_eq!(
            elements[0].metadata,
            ElementMetadata::Heading { level: 2, style: HeadingStyle::Markdown }
        );
        assert_eq!(
            elements[1].metadata,
            ElementMetadata::Heading { level: 2, style: HeadingStyle::Numbered }
        );
        assert_eq!(elements[2].content, "3 Results");
        assert_eq!(
            elements[3].metadata,
            ElementMetadata::Heading { level: 1, style: HeadingStyle::AllCaps }
        );
        assert_eq!(elements[0].confidence, 0.9);
    }

    #[test]
    fn test_headings_disabled() {
        let options = LayoutOptions {
            respect_headings: false,
            ..Default::default()
        };
        let detector = LayoutDetector::new(options, ConfidencePriors::default());
        assert!(detector.detect("# Title\nbody", &PlaceholderMap::empty()).is_empty());
    }

    #[test]
    fn test_sentence_after_number_is_not_a_heading() {
        assert!(detect("3 Apples were eaten. Then more.").is_empty());
    }

    #[test]
    fn test_adjacent_items_merge_into_list() {
        let text = "Intro\n- one\n- two\n- three\n\nOutro\n1) alone\n";
        let elements = detect(text);
        assert_eq!(types(&elements), vec![ElementType::List, ElementType::ListItem]);
        assert_eq!(
            elements[0].metadata,
            ElementMetadata::List { item_count: 3, ordered: false }
        );
        assert_eq!(elements[0].content, "- one\n- two\n- three");
        assert_eq!(
            elements[1].metadata,
            ElementMetadata::ListItem {
                marker: ListMarker::Numbered,
                ordered: true,
                indent: 0
            }
        );
    }

    #[test]
    fn test_blank_line_within_gap_still_merges() {
        let elements = detect("a. first\n\nb. second\n");
        assert_eq!(
            elements[0].metadata,
            ElementMetadata::List { item_count: 2, ordered: true }
        );
    }

    #[test]
    fn test_table_detection() {
        let text = "Before\n| a | b | c |\n|---|---|---|\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |\nAfter";
        let elements = detect(text);
        assert_eq!(types(&elements), vec![ElementType::Table]);
        let table = &elements[0];
        assert_eq!(
            table.metadata,
            ElementMetadata::Table { rows: 3, columns: 3, has_header: true }
        );
        assert_eq!(&text[table.start()..table.end()], table.content);
        assert!(table.content.starts_with("| a"));
        assert!(table.content.ends_with("6 |"));
    }

    #[test]
    fn test_single_pipe_row_is_not_a_table() {
        assert!(detect("| lonely | row |\nplain text").is_empty());
    }

    #[test]
    fn test_tables_disabled() {
        let options = LayoutOptions {
            preserve_tables: false,
            ..Default::default()
        };
        let detector = LayoutDetector::new(options, ConfidencePriors::default());
        let elements = detector.detect("| a | b |\n| c | d |", &PlaceholderMap::empty());
        assert!(elements.iter().all(|e| e.element_type() != ElementType::Table));
    }

    #[test]
    fn test_paragraphs_when_enabled() {
        let options = LayoutOptions {
            detect_paragraphs: true,
            ..Default::default()
        };
        let detector = LayoutDetector::new(options, ConfidencePriors::default());
        let text = "first line\nsecond line\n\n# Head\nlast";
        let elements = detector.detect(text, &PlaceholderMap::empty());
        assert_eq!(
            types(&elements),
            vec![ElementType::Paragraph, ElementType::Heading, ElementType::Paragraph]
        );
        assert_eq!(elements[0].content, "first line\nsecond line");
        assert_eq!(elements[0].confidence, 0.7);
    }

    #[test]
    fn test_formula_elements_use_substituted_positions() {
        let text = "## Energy $E = mc^2$\nWater H2O.";
        let scan = FormulaDetector::default().detect(text);
        let (substituted, map) = substitute(text, &scan.formulas);
        let elements = LayoutDetector::default().detect(&substituted, &map);

        let formulas: Vec<&LayoutElement> = elements
            .iter()
            .filter(|e| e.element_type() == ElementType::Formula)
            .collect();
        assert_eq!(formulas.len(), 2);
        assert_eq!(formulas[0].content, "$E = mc^2$");
        let (start, end) = formulas[0].position;
        assert_eq!(&substituted[start..end], "[FORMULA_0]");

        // Heading content shows the formula, not the token
        let heading = &elements[0];
        assert_eq!(heading.element_type(), ElementType::Heading);
        assert_eq!(heading.content, "## Energy $E = mc^2$");
    }

    #[test]
    fn test_elements_sorted() {
        let text = "# A\n- x\n- y\n| a | b |\n| c | d |\n";
        let elements = detect(text);
        for pair in elements.windows(2) {
            assert!(pair[0].position <= pair[1].position);
        }
    }
}
