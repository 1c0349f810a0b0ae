use serde::{Deserialize, Serialize};
use std::fmt;

/// Family a detected formula belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaKind {
    Math,
    Chemistry,
    Physics,
}

impl FormulaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaKind::Math => "math",
            FormulaKind::Chemistry => "chemistry",
            FormulaKind::Physics => "physics",
        }
    }
}

impl fmt::Display for FormulaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element symbol and atom count parsed from a chemical species
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementCount {
    pub symbol: String,
    pub count: u32,
}

/// Kind-specific details of a formula
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormulaDetails {
    Math {
        display: bool,
    },
    Chemistry {
        elements: Vec<ElementCount>,
        is_reaction: bool,
    },
    Physics {
        quantity: String,
        value: String,
        unit: Option<String>,
    },
}

/// A detected formula with its canonical renderings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formula {
    pub original_text: String,
    pub latex_repr: String,
    pub mathml_repr: String,
    pub formula_type: FormulaKind,
    /// Byte span in the text the formula was detected in
    pub position: (usize, usize),
    pub confidence: f64,
    pub metadata: FormulaDetails,
}

impl Formula {
    pub fn start(&self) -> usize {
        self.position.0
    }

    pub fn end(&self) -> usize {
        self.position.1
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start() < end && start < self.end()
    }
}
