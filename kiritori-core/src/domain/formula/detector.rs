//! Formula candidate detection
//!
//! Categories are scanned in priority order (display math, inline math,
//! chemical reactions, chemical species, physical quantities). A candidate
//! overlapping a span accepted by an earlier category is skipped.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::render::{self, ConversionError, Rendered};
use super::types::{Formula, FormulaDetails, FormulaKind};
use crate::domain::priors::ConfidencePriors;
use crate::error::ChunkingWarning;

const SPECIES: &str =
    r"\d*[A-Z][a-z]?\d*(?:[A-Z][a-z]?\d*|\((?:[A-Z][a-z]?\d*)+\)\d*)*";

static DISPLAY_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("valid display math regex"));

static INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([^$\n]+?)\$").expect("valid inline math regex"));

static REACTION: LazyLock<Regex> = LazyLock::new(|| {
    let side = format!(r"{SPECIES}(?:[ \t]*\+[ \t]*{SPECIES})*");
    Regex::new(&format!(
        r"\b{side}[ \t]*(?:->|→|⇌|<=>|=>)[ \t]*{side}"
    ))
    .expect("valid reaction regex")
});

static STANDALONE_SPECIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{SPECIES}")).expect("valid species regex"));

static ELEMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]?").expect("valid element token regex"));

/// Elements that commonly stand alone as molecules (`O2`, `S8`)
const MOLECULAR_ELEMENTS: [&str; 9] = ["H", "N", "O", "F", "Cl", "Br", "I", "P", "S"];

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?P<name>[A-Za-z][A-Za-z0-9_]{0,15})[ \t]*=[ \t]*",
        r"(?P<value>-?\d+(?:\.\d+)?(?:[ \t]*[×x*][ \t]*10\^\{?-?\d+\}?|[eE][-+]?\d+)?)",
        r"(?:[ \t]*(?P<unit>[A-Za-zμΩ°%][A-Za-zμΩ°%/·*^0-9-]*))?",
    ))
    .expect("valid quantity regex")
});

/// Formulas found in one text plus the candidates that had to be dropped
#[derive(Debug, Default)]
pub struct FormulaScan {
    /// Accepted formulas sorted by start offset; spans are disjoint
    pub formulas: Vec<Formula>,
    pub warnings: Vec<ChunkingWarning>,
}

/// Rule-based formula detector
#[derive(Debug, Clone, Default)]
pub struct FormulaDetector {
    priors: ConfidencePriors,
}

impl FormulaDetector {
    pub fn new(priors: ConfidencePriors) -> Self {
        Self { priors }
    }

    /// Detects every formula in `text`
    pub fn detect(&self, text: &str) -> FormulaScan {
        let mut scan = FormulaScan::default();

        self.detect_display_math(text, &mut scan);
        self.detect_inline_math(text, &mut scan);
        self.detect_reactions(text, &mut scan);
        self.detect_species(text, &mut scan);
        self.detect_quantities(text, &mut scan);

        scan.formulas.sort_by_key(Formula::start);
        debug!(
            "formula scan: {} accepted, {} dropped",
            scan.formulas.len(),
            scan.warnings.len()
        );
        scan
    }

    fn detect_display_math(&self, text: &str, scan: &mut FormulaScan) {
        for caps in DISPLAY_MATH.captures_iter(text) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let span = (whole.start(), whole.end());
            if overlaps_any(&scan.formulas, span) {
                continue;
            }
            let outcome = render::render_math(body.as_str(), true).map(|rendered| {
                (rendered, FormulaDetails::Math { display: true })
            });
            self.accept(text, span, FormulaKind::Math, self.priors.display_math, outcome, scan);
        }
    }

    fn detect_inline_math(&self, text: &str, scan: &mut FormulaScan) {
        let mut from = 0;
        while let Some(found) = INLINE_MATH.find_at(text, from) {
            let span = (found.start(), found.end());
            let body = &text[span.0 + 1..span.1 - 1];

            let escaped = text[..span.0].ends_with('\\');
            let padded = body.starts_with(char::is_whitespace) || body.ends_with(char::is_whitespace);
            let currency = text[span.1..].starts_with(|c: char| c.is_ascii_digit());
            if escaped || padded || currency || overlaps_any(&scan.formulas, span) {
                // Retry from the closing dollar; it may open a real formula
                from = span.1 - 1;
                continue;
            }

            let outcome = render::render_math(body, false)
                .map(|rendered| (rendered, FormulaDetails::Math { display: false }));
            self.accept(text, span, FormulaKind::Math, self.priors.inline_math, outcome, scan);
            from = span.1;
        }
    }

    fn detect_reactions(&self, text: &str, scan: &mut FormulaScan) {
        for found in REACTION.find_iter(text) {
            let span = (found.start(), found.end());
            if overlaps_any(&scan.formulas, span) || followed_by_word(text, span.1) {
                continue;
            }
            let outcome = render_chemistry(found.as_str());
            self.accept(text, span, FormulaKind::Chemistry, self.priors.chemistry, outcome, scan);
        }
    }

    fn detect_species(&self, text: &str, scan: &mut FormulaScan) {
        for found in STANDALONE_SPECIES.find_iter(text) {
            let span = (found.start(), found.end());
            let candidate = found.as_str().trim_start_matches(|c: char| c.is_ascii_digit());
            // Element counts make it a formula; bare capitalized words are prose
            if !candidate.contains(|c: char| c.is_ascii_digit())
                || !looks_like_species(candidate)
                || followed_by_word(text, span.1)
                || overlaps_any(&scan.formulas, span)
            {
                continue;
            }
            let outcome = render_chemistry(found.as_str());
            self.accept(text, span, FormulaKind::Chemistry, self.priors.chemistry, outcome, scan);
        }
    }

    fn detect_quantities(&self, text: &str, scan: &mut FormulaScan) {
        for caps in QUANTITY.captures_iter(text) {
            let (Some(whole), Some(name), Some(value)) =
                (caps.get(0), caps.name("name"), caps.name("value"))
            else {
                continue;
            };
            let unit = caps
                .name("unit")
                .filter(|unit| render::is_known_unit(unit.as_str()));
            let scientific = value
                .as_str()
                .contains(|c: char| matches!(c, 'e' | 'E' | '^'));
            if unit.is_none() && !scientific {
                continue;
            }

            let end = unit.map_or(value.end(), |unit| unit.end());
            let span = (whole.start(), end);
            if overlaps_any(&scan.formulas, span) {
                continue;
            }

            let unit_text = unit.map(|unit| unit.as_str().to_string());
            let outcome = render::render_physics(name.as_str(), value.as_str(), unit_text.as_deref())
                .map(|rendered| {
                    (
                        rendered,
                        FormulaDetails::Physics {
                            quantity: name.as_str().to_string(),
                            value: value.as_str().to_string(),
                            unit: unit_text.clone(),
                        },
                    )
                });
            self.accept(text, span, FormulaKind::Physics, self.priors.physics, outcome, scan);
        }
    }

    fn accept(
        &self,
        text: &str,
        span: (usize, usize),
        kind: FormulaKind,
        confidence: f64,
        outcome: Result<(Rendered, FormulaDetails), ConversionError>,
        scan: &mut FormulaScan,
    ) {
        let original_text = text[span.0..span.1].to_string();
        match outcome {
            Ok((rendered, metadata)) => scan.formulas.push(Formula {
                original_text,
                latex_repr: rendered.latex,
                mathml_repr: rendered.mathml,
                formula_type: kind,
                position: span,
                confidence,
                metadata,
            }),
            Err(err) => {
                debug!("dropping {kind} candidate at {}: {err}", span.0);
                scan.warnings.push(ChunkingWarning::FormulaConversion {
                    text: original_text,
                    kind,
                    position: span.0,
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn render_chemistry(source: &str) -> Result<(Rendered, FormulaDetails), ConversionError> {
    render::render_chemistry(source).map(|(rendered, elements, is_reaction)| {
        (
            rendered,
            FormulaDetails::Chemistry {
                elements,
                is_reaction,
            },
        )
    })
}

/// Standalone tokens such as `A4` or `MP3` are paper sizes and model
/// numbers. Only runs made of real element symbols count as species, with
/// a single symbol allowed for the molecular elements.
fn looks_like_species(candidate: &str) -> bool {
    let symbols: Vec<&str> = ELEMENT_TOKEN
        .find_iter(candidate)
        .map(|m| m.as_str())
        .collect();
    if !symbols.iter().all(|symbol| render::is_element_symbol(symbol)) {
        return false;
    }
    match symbols.as_slice() {
        [] => false,
        [single] => MOLECULAR_ELEMENTS.contains(single),
        _ => true,
    }
}

fn overlaps_any(formulas: &[Formula], span: (usize, usize)) -> bool {
    formulas.iter().any(|f| f.overlaps(span.0, span.1))
}

fn followed_by_word(text: &str, end: usize) -> bool {
    text[end..].starts_with(char::is_alphanumeric)
}
