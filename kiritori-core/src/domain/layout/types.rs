use serde::Serialize;
use std::fmt;

use crate::domain::formula::Formula;

/// Kind of structural element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Paragraph,
    Heading,
    List,
    ListItem,
    Table,
    Formula,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::Heading => "heading",
            ElementType::List => "list",
            ElementType::ListItem => "list_item",
            ElementType::Table => "table",
            ElementType::Formula => "formula",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a heading was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// `#` through `######`
    Markdown,
    /// `1.2 Title` or `3 Title`
    Numbered,
    /// A line in capital letters
    AllCaps,
}

/// Marker that introduces a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMarker {
    /// `-`, `*`, `+` or `•`
    Bullet,
    /// `1.` or `1)`
    Numbered,
    /// `a.` or `b)`
    Lettered,
}

impl ListMarker {
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ListMarker::Bullet)
    }
}

/// Type-specific metadata; the variant determines the element type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementMetadata {
    Heading {
        level: u8,
        style: HeadingStyle,
    },
    List {
        item_count: usize,
        ordered: bool,
    },
    ListItem {
        marker: ListMarker,
        ordered: bool,
        indent: usize,
    },
    Table {
        rows: usize,
        columns: usize,
        has_header: bool,
    },
    Formula(Formula),
    Paragraph {},
}

impl ElementMetadata {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementMetadata::Paragraph {} => ElementType::Paragraph,
            ElementMetadata::Heading { .. } => ElementType::Heading,
            ElementMetadata::List { .. } => ElementType::List,
            ElementMetadata::ListItem { .. } => ElementType::ListItem,
            ElementMetadata::Table { .. } => ElementType::Table,
            ElementMetadata::Formula(_) => ElementType::Formula,
        }
    }
}

/// A detected structural unit
///
/// `position` is a byte span in the text the detector ran on, which is the
/// placeholder-substituted text when formulas are handled.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub content: String,
    pub metadata: ElementMetadata,
    pub position: (usize, usize),
    pub confidence: f64,
}

impl LayoutElement {
    pub fn element_type(&self) -> ElementType {
        self.metadata.element_type()
    }

    pub fn start(&self) -> usize {
        self.position.0
    }

    pub fn end(&self) -> usize {
        self.position.1
    }

    /// Returns true when cutting at `offset` would split this element
    pub fn is_split_by(&self, offset: usize) -> bool {
        self.start() < offset && offset < self.end()
    }

    /// Returns true when the element intersects `[start, end)`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start() < end && start < self.end()
    }
}
