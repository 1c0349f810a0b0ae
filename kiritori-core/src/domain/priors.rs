//! Per-type confidence priors for detected elements

use serde::{Deserialize, Serialize};

/// Confidence assigned to each kind of detected element
///
/// Detection is rule based, so confidence is a fixed prior per rule rather
/// than a computed score. All values must lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePriors {
    pub heading: f64,
    pub list_item: f64,
    pub list: f64,
    pub table: f64,
    pub display_math: f64,
    pub inline_math: f64,
    pub chemistry: f64,
    pub physics: f64,
    pub paragraph: f64,
}

impl Default for ConfidencePriors {
    fn default() -> Self {
        Self {
            heading: 0.9,
            list_item: 0.8,
            list: 0.85,
            table: 0.85,
            display_math: 0.95,
            inline_math: 0.9,
            chemistry: 0.8,
            physics: 0.75,
            paragraph: 0.7,
        }
    }
}

impl ConfidencePriors {
    fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("heading", self.heading),
            ("list_item", self.list_item),
            ("list", self.list),
            ("table", self.table),
            ("display_math", self.display_math),
            ("inline_math", self.inline_math),
            ("chemistry", self.chemistry),
            ("physics", self.physics),
            ("paragraph", self.paragraph),
        ]
    }

    /// Returns the name of the first prior outside `[0, 1]`
    pub fn first_invalid(&self) -> Option<&'static str> {
        self.entries()
            .into_iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
            .map(|(name, _)| name)
    }
}
