//! Best-effort LaTeX and MathML rendering for detected formulas
//!
//! Rendering is deliberately small: it understands enough TeX to build
//! MathML for common inline math, parses chemical species against the
//! periodic table and normalizes physical quantities. Anything it cannot
//! make sense of is reported as a [`ConversionError`] so the detector can
//! drop that single candidate.

use thiserror::Error;

use super::types::ElementCount;

const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Deepest brace, command or parenthesis nesting the renderers accept
const MAX_NESTING: usize = 64;

/// Why a candidate could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    fn new(message: impl Into<String>) -> Self {
        ConversionError(message.into())
    }
}

type RenderResult<T> = Result<T, ConversionError>;

/// LaTeX and MathML renderings of one formula
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub latex: String,
    pub mathml: String,
}

#[rustfmt::skip]
const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

const BASE_UNITS: [&str; 32] = [
    "m", "s", "g", "A", "K", "mol", "cd", "N", "J", "W", "Pa", "Hz", "V", "C", "Ω", "T", "F",
    "H", "L", "eV", "min", "h", "rad", "sr", "bar", "atm", "°C", "°F", "°", "%", "Wb", "S",
];

const UNIT_PREFIXES: [&str; 10] = ["k", "M", "G", "m", "μ", "u", "n", "c", "d", "p"];

/// Returns true for the chemical element symbols H through Og
pub fn is_element_symbol(symbol: &str) -> bool {
    ELEMENT_SYMBOLS.contains(&symbol)
}

/// Returns true when every factor of `unit` is a (prefixed) SI-style unit
pub fn is_known_unit(unit: &str) -> bool {
    if unit.is_empty() {
        return false;
    }
    unit.split(['/', '·', '*']).all(|factor| {
        let base = factor
            .trim_end_matches(|c: char| c.is_ascii_digit() || c == '-' || c == '^');
        !base.is_empty()
            && (BASE_UNITS.contains(&base)
                || UNIT_PREFIXES.iter().any(|prefix| {
                    base.strip_prefix(prefix)
                        .is_some_and(|rest| BASE_UNITS.contains(&rest))
                }))
    })
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn wrap_math(body: &str, display: bool) -> String {
    let mode = if display { "block" } else { "inline" };
    format!(r#"<math xmlns="{MATHML_NS}" display="{mode}"><mrow>{body}</mrow></math>"#)
}

// ---------------------------------------------------------------------------
// TeX math
// ---------------------------------------------------------------------------

/// Renders the TeX body of a `$...$` or `$$...$$` span
pub fn render_math(source: &str, display: bool) -> RenderResult<Rendered> {
    let body = source.trim();
    if body.is_empty() {
        return Err(ConversionError::new("empty formula"));
    }
    let mut parser = MathParser {
        chars: body.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let nodes = parser.parse_sequence(false)?;
    Ok(Rendered {
        latex: body.to_string(),
        mathml: wrap_math(&nodes.concat(), display),
    })
}

struct MathParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl MathParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_sequence(&mut self, in_group: bool) -> RenderResult<Vec<String>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None if in_group => {
                    return Err(ConversionError::new("unbalanced braces: missing '}'"))
                }
                None => break,
                Some('}') if in_group => {
                    self.pos += 1;
                    break;
                }
                Some('}') => {
                    return Err(ConversionError::new("unbalanced braces: unexpected '}'"))
                }
                Some(_) => {
                    let base = self.parse_atom()?;
                    nodes.push(self.parse_scripts(base)?);
                }
            }
        }
        Ok(nodes)
    }

    fn parse_scripts(&mut self, base: String) -> RenderResult<String> {
        let mut sub = None;
        let mut sup = None;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('_') if sub.is_none() => {
                    self.pos += 1;
                    sub = Some(self.parse_argument("_")?);
                }
                Some('^') if sup.is_none() => {
                    self.pos += 1;
                    sup = Some(self.parse_argument("^")?);
                }
                Some('_') | Some('^') => {
                    return Err(ConversionError::new("double subscript or superscript"))
                }
                _ => break,
            }
        }
        Ok(match (sub, sup) {
            (None, None) => base,
            (Some(sub), None) => format!("<msub>{base}{sub}</msub>"),
            (None, Some(sup)) => format!("<msup>{base}{sup}</msup>"),
            (Some(sub), Some(sup)) => format!("<msubsup>{base}{sub}{sup}</msubsup>"),
        })
    }

    fn parse_argument(&mut self, owner: &str) -> RenderResult<String> {
        self.skip_whitespace();
        match self.peek() {
            None | Some('}') => Err(ConversionError::new(format!(
                "missing argument for '{owner}'"
            ))),
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> RenderResult<String> {
        if self.depth >= MAX_NESTING {
            return Err(ConversionError::new("formula nesting too deep"));
        }
        self.depth += 1;
        let atom = self.parse_atom_inner();
        self.depth -= 1;
        atom
    }

    fn parse_atom_inner(&mut self) -> RenderResult<String> {
        let Some(ch) = self.peek() else {
            return Err(ConversionError::new("unexpected end of formula"));
        };
        self.pos += 1;
        match ch {
            '{' => {
                let inner = self.parse_sequence(true)?;
                Ok(format!("<mrow>{}</mrow>", inner.concat()))
            }
            '^' | '_' => Err(ConversionError::new(format!("'{ch}' without a base"))),
            '\\' => self.parse_command(),
            c if c.is_ascii_digit() => {
                let start = self.pos - 1;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.')
                {
                    self.pos += 1;
                }
                let number: String = self.chars[start..self.pos].iter().collect();
                Ok(format!("<mn>{number}</mn>"))
            }
            c if c.is_alphabetic() => Ok(format!("<mi>{c}</mi>")),
            c => Ok(format!("<mo>{}</mo>", escape_xml(&c.to_string()))),
        }
    }

    fn parse_command(&mut self) -> RenderResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if start == self.pos {
            // Control symbol such as `\,` or `\{`
            let Some(symbol) = self.peek() else {
                return Err(ConversionError::new("dangling backslash"));
            };
            self.pos += 1;
            return Ok(match symbol {
                ',' | ';' | ':' | '!' | ' ' => r#"<mspace width="0.167em"/>"#.to_string(),
                other => format!("<mo>{}</mo>", escape_xml(&other.to_string())),
            });
        }

        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.parse_argument("\\frac")?;
                let denominator = self.parse_argument("\\frac")?;
                Ok(format!("<mfrac>{numerator}{denominator}</mfrac>"))
            }
            "sqrt" => {
                let radicand = self.parse_argument("\\sqrt")?;
                Ok(format!("<msqrt>{radicand}</msqrt>"))
            }
            "left" | "right" => {
                self.skip_whitespace();
                match self.peek() {
                    Some(_) => self.parse_atom(),
                    None => Err(ConversionError::new(format!("missing delimiter for \\{name}"))),
                }
            }
            "mathrm" | "text" | "mathbf" | "operatorname" => {
                let inner = self.parse_argument(&format!("\\{name}"))?;
                Ok(format!(r#"<mstyle mathvariant="normal">{inner}</mstyle>"#))
            }
            _ => Ok(command_symbol(&name)),
        }
    }
}

fn command_symbol(name: &str) -> String {
    let greek = match name {
        "alpha" => Some('α'),
        "beta" => Some('β'),
        "gamma" => Some('γ'),
        "delta" => Some('δ'),
        "epsilon" | "varepsilon" => Some('ε'),
        "zeta" => Some('ζ'),
        "eta" => Some('η'),
        "theta" => Some('θ'),
        "kappa" => Some('κ'),
        "lambda" => Some('λ'),
        "mu" => Some('μ'),
        "nu" => Some('ν'),
        "xi" => Some('ξ'),
        "pi" => Some('π'),
        "rho" => Some('ρ'),
        "sigma" => Some('σ'),
        "tau" => Some('τ'),
        "phi" | "varphi" => Some('φ'),
        "chi" => Some('χ'),
        "psi" => Some('ψ'),
        "omega" => Some('ω'),
        "Gamma" => Some('Γ'),
        "Delta" => Some('Δ'),
        "Theta" => Some('Θ'),
        "Lambda" => Some('Λ'),
        "Sigma" => Some('Σ'),
        "Phi" => Some('Φ'),
        "Psi" => Some('Ψ'),
        "Omega" => Some('Ω'),
        "infty" => Some('∞'),
        "partial" => Some('∂'),
        "nabla" => Some('∇'),
        _ => None,
    };
    if let Some(symbol) = greek {
        return format!("<mi>{symbol}</mi>");
    }

    let operator = match name {
        "times" => Some("×"),
        "cdot" => Some("·"),
        "pm" => Some("±"),
        "mp" => Some("∓"),
        "div" => Some("÷"),
        "leq" | "le" => Some("≤"),
        "geq" | "ge" => Some("≥"),
        "neq" | "ne" => Some("≠"),
        "approx" => Some("≈"),
        "equiv" => Some("≡"),
        "propto" => Some("∝"),
        "to" | "rightarrow" => Some("→"),
        "leftarrow" => Some("←"),
        "Rightarrow" => Some("⇒"),
        "sum" => Some("∑"),
        "prod" => Some("∏"),
        "int" => Some("∫"),
        "in" => Some("∈"),
        _ => None,
    };
    match operator {
        Some(op) => format!("<mo>{op}</mo>"),
        None => format!("<mi>{name}</mi>"),
    }
}

// ---------------------------------------------------------------------------
// Chemistry
// ---------------------------------------------------------------------------

/// Renders a chemical species or reaction
///
/// Returns the renderings, the aggregated element list and whether the
/// expression is a reaction.
pub fn render_chemistry(source: &str) -> RenderResult<(Rendered, Vec<ElementCount>, bool)> {
    let tokens = tokenize_chemistry(source)?;
    if !tokens.iter().any(|t| matches!(t, ChemToken::Species(_))) {
        return Err(ConversionError::new("no chemical species found"));
    }

    let mut latex_parts = Vec::new();
    let mut mathml = String::new();
    let mut elements: Vec<ElementCount> = Vec::new();
    let mut is_reaction = false;

    for token in &tokens {
        match token {
            ChemToken::Plus => {
                latex_parts.push("+".to_string());
                mathml.push_str("<mo>+</mo>");
            }
            ChemToken::Arrow(arrow) => {
                is_reaction = true;
                latex_parts.push(arrow.latex().to_string());
                mathml.push_str(&format!("<mo>{}</mo>", arrow.symbol()));
            }
            ChemToken::Species(species) => {
                latex_parts.push(species.text.clone());
                mathml.push_str(&species.mathml);
                for (symbol, count) in &species.atoms {
                    match elements.iter_mut().find(|e| &e.symbol == symbol) {
                        Some(existing) => existing.count = existing.count.saturating_add(*count),
                        None => elements.push(ElementCount {
                            symbol: symbol.clone(),
                            count: *count,
                        }),
                    }
                }
            }
        }
    }

    let rendered = Rendered {
        latex: format!(r"\ce{{{}}}", latex_parts.join(" ")),
        mathml: wrap_math(&mathml, false),
    };
    Ok((rendered, elements, is_reaction))
}

#[derive(Debug, Clone, Copy)]
enum Arrow {
    Forward,
    Equilibrium,
}

impl Arrow {
    fn latex(&self) -> &'static str {
        match self {
            Arrow::Forward => "->",
            Arrow::Equilibrium => "<=>",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Arrow::Forward => "→",
            Arrow::Equilibrium => "⇌",
        }
    }
}

#[derive(Debug)]
struct Species {
    text: String,
    mathml: String,
    atoms: Vec<(String, u32)>,
}

#[derive(Debug)]
enum ChemToken {
    Species(Species),
    Plus,
    Arrow(Arrow),
}

fn tokenize_chemistry(source: &str) -> RenderResult<Vec<ChemToken>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        let rest: String = chars[pos..chars.len().min(pos + 3)].iter().collect();
        if ch.is_whitespace() {
            pos += 1;
        } else if ch == '+' {
            tokens.push(ChemToken::Plus);
            pos += 1;
        } else if ch == '→' {
            tokens.push(ChemToken::Arrow(Arrow::Forward));
            pos += 1;
        } else if ch == '⇌' {
            tokens.push(ChemToken::Arrow(Arrow::Equilibrium));
            pos += 1;
        } else if rest.starts_with("<=>") {
            tokens.push(ChemToken::Arrow(Arrow::Equilibrium));
            pos += 3;
        } else if rest.starts_with("->") || rest.starts_with("=>") {
            tokens.push(ChemToken::Arrow(Arrow::Forward));
            pos += 2;
        } else if ch.is_ascii_digit() || ch.is_ascii_uppercase() || ch == '(' {
            let (species, next) = parse_species(&chars, pos)?;
            tokens.push(ChemToken::Species(species));
            pos = next;
        } else {
            return Err(ConversionError::new(format!(
                "unexpected character '{ch}' in chemical formula"
            )));
        }
    }

    Ok(tokens)
}

fn read_number(chars: &[char], pos: &mut usize) -> Option<u32> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        return None;
    }
    chars[start..*pos].iter().collect::<String>().parse().ok()
}

fn parse_species(chars: &[char], start: usize) -> RenderResult<(Species, usize)> {
    let mut pos = start;
    let mut mathml = String::new();

    let coefficient = read_number(chars, &mut pos);
    if let Some(c) = coefficient {
        mathml.push_str(&format!("<mn>{c}</mn>"));
    }

    let mut atoms = Vec::new();
    let body_start = pos;
    parse_groups(chars, &mut pos, &mut mathml, &mut atoms, 1, 0)?;
    if pos == body_start {
        return Err(ConversionError::new("coefficient without a species"));
    }

    let text: String = chars[start..pos].iter().collect();
    Ok((Species { text, mathml, atoms }, pos))
}

fn parse_groups(
    chars: &[char],
    pos: &mut usize,
    mathml: &mut String,
    atoms: &mut Vec<(String, u32)>,
    multiplier: u32,
    depth: usize,
) -> RenderResult<()> {
    if depth > MAX_NESTING {
        return Err(ConversionError::new("formula nesting too deep"));
    }
    let nested = depth > 0;
    while *pos < chars.len() {
        let ch = chars[*pos];
        if ch.is_ascii_uppercase() {
            let mut symbol = ch.to_string();
            *pos += 1;
            if *pos < chars.len() && chars[*pos].is_ascii_lowercase() {
                symbol.push(chars[*pos]);
                *pos += 1;
            }
            if !is_element_symbol(&symbol) {
                return Err(ConversionError::new(format!(
                    "unknown element symbol '{symbol}'"
                )));
            }
            let count = read_number(chars, pos);
            match count {
                Some(n) => mathml.push_str(&format!("<msub><mi>{symbol}</mi><mn>{n}</mn></msub>")),
                None => mathml.push_str(&format!("<mi>{symbol}</mi>")),
            }
            atoms.push((symbol, count.unwrap_or(1).saturating_mul(multiplier)));
        } else if ch == '(' {
            *pos += 1;
            let mut inner_mathml = String::new();
            let mut inner_atoms = Vec::new();
            parse_groups(chars, pos, &mut inner_mathml, &mut inner_atoms, 1, depth + 1)?;
            let count = read_number(chars, pos).unwrap_or(1);
            let group = format!("<mrow><mo>(</mo>{inner_mathml}<mo>)</mo></mrow>");
            if count > 1 {
                mathml.push_str(&format!("<msub>{group}<mn>{count}</mn></msub>"));
            } else {
                mathml.push_str(&group);
            }
            atoms.extend(
                inner_atoms
                    .into_iter()
                    .map(|(symbol, n)| (symbol, n.saturating_mul(count).saturating_mul(multiplier))),
            );
        } else if ch == ')' {
            if !nested {
                return Err(ConversionError::new("unbalanced ')' in chemical formula"));
            }
            *pos += 1;
            return Ok(());
        } else {
            break;
        }
    }
    if nested {
        return Err(ConversionError::new("unbalanced '(' in chemical formula"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Renders `quantity = value [unit]`
pub fn render_physics(quantity: &str, value: &str, unit: Option<&str>) -> RenderResult<Rendered> {
    let (mantissa, exponent) = split_scientific(value)?;

    let mut latex = format!("{quantity} = {mantissa}");
    let mut mathml = format!(
        "<mi>{}</mi><mo>=</mo>{}",
        escape_xml(quantity),
        number_mathml(&mantissa)
    );
    if let Some(exp) = &exponent {
        latex.push_str(&format!(r" \times 10^{{{exp}}}"));
        mathml.push_str(&format!(
            "<mo>×</mo><msup><mn>10</mn>{}</msup>",
            number_mathml(exp)
        ));
    }
    if let Some(unit) = unit {
        if !is_known_unit(unit) {
            return Err(ConversionError::new(format!("unknown unit '{unit}'")));
        }
        latex.push_str(&format!(r"\,\mathrm{{{unit}}}"));
        mathml.push_str(&format!(
            r#"<mspace width="0.167em"/><mi mathvariant="normal">{}</mi>"#,
            escape_xml(unit)
        ));
    }

    Ok(Rendered {
        latex,
        mathml: wrap_math(&mathml, false),
    })
}

fn number_mathml(number: &str) -> String {
    match number.strip_prefix('-') {
        Some(rest) => format!("<mo>-</mo><mn>{rest}</mn>"),
        None => format!("<mn>{number}</mn>"),
    }
}

/// Splits `3e8`, `3.0×10^8`, `3x10^{-4}` into mantissa and exponent
fn split_scientific(value: &str) -> RenderResult<(String, Option<String>)> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let is_number = |s: &str| {
        let s = s.strip_prefix(['-', '+']).unwrap_or(s);
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.')
    };

    for separator in ["×10^", "x10^", "*10^"] {
        if let Some((mantissa, exp)) = compact.split_once(separator) {
            let exp = exp.trim_start_matches('{').trim_end_matches('}');
            if is_number(mantissa) && is_number(exp) {
                return Ok((mantissa.to_string(), Some(exp.trim_start_matches('+').to_string())));
            }
            return Err(ConversionError::new(format!("malformed number '{value}'")));
        }
    }
    if let Some((mantissa, exp)) = compact.split_once(['e', 'E']) {
        if is_number(mantissa) && is_number(exp) {
            return Ok((mantissa.to_string(), Some(exp.trim_start_matches('+').to_string())));
        }
        return Err(ConversionError::new(format!("malformed number '{value}'")));
    }
    if is_number(&compact) {
        Ok((compact, None))
    } else {
        Err(ConversionError::new(format!("malformed number '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_fraction_and_script() {
        let rendered = render_math(r"\frac{a}{b} + x^2", false).unwrap();
        assert_eq!(rendered.latex, r"\frac{a}{b} + x^2");
        assert!(rendered
            .mathml
            .contains("<mfrac><mrow><mi>a</mi></mrow><mrow><mi>b</mi></mrow></mfrac>"));
        assert!(rendered.mathml.contains("<msup><mi>x</mi><mn>2</mn></msup>"));
        assert!(rendered.mathml.contains(r#"display="inline""#));
    }

    #[test]
    fn test_math_greek_and_display_mode() {
        let rendered = render_math(r"\alpha \leq \beta", true).unwrap();
        assert!(rendered.mathml.contains("<mi>α</mi><mo>≤</mo><mi>β</mi>"));
        assert!(rendered.mathml.contains(r#"display="block""#));
    }

    #[test]
    fn test_math_subsup() {
        let rendered = render_math("x_i^2", false).unwrap();
        assert!(rendered
            .mathml
            .contains("<msubsup><mi>x</mi><mi>i</mi><mn>2</mn></msubsup>"));
    }

    #[test]
    fn test_math_failures() {
        assert!(render_math(r"\frac{a}{b", false).is_err());
        assert!(render_math("a}", false).is_err());
        assert!(render_math("^2", false).is_err());
        assert!(render_math("x^", false).is_err());
        assert!(render_math("   ", false).is_err());
        assert!(render_math(r"\frac{a}", false).is_err());
    }

    #[test]
    fn test_math_deep_nesting_is_rejected() {
        let braces = format!("{}x{}", "{".repeat(20_000), "}".repeat(20_000));
        let err = render_math(&braces, true).unwrap_err();
        assert_eq!(err.to_string(), "formula nesting too deep");

        let roots = format!("{}x", r"\sqrt".repeat(20_000));
        assert!(render_math(&roots, false).is_err());

        let shallow = format!("{}x{}", "{".repeat(10), "}".repeat(10));
        assert!(render_math(&shallow, false).is_ok());
    }

    #[test]
    fn test_chemistry_deep_parentheses_rejected() {
        let formula = format!("{}H{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(render_chemistry(&formula).is_err());
        assert!(render_chemistry("((H)2O)3").is_ok());
    }

    #[test]
    fn test_math_escapes_operators() {
        let rendered = render_math("a < b", false).unwrap();
        assert!(rendered.mathml.contains("<mo>&lt;</mo>"));
    }

    #[test]
    fn test_chemistry_water() {
        let (rendered, elements, is_reaction) = render_chemistry("H2O").unwrap();
        assert_eq!(rendered.latex, r"\ce{H2O}");
        assert!(!is_reaction);
        assert_eq!(
            elements,
            vec![
                ElementCount { symbol: "H".into(), count: 2 },
                ElementCount { symbol: "O".into(), count: 1 },
            ]
        );
        assert!(rendered.mathml.contains("<msub><mi>H</mi><mn>2</mn></msub><mi>O</mi>"));
    }

    #[test]
    fn test_chemistry_reaction() {
        let (rendered, elements, is_reaction) = render_chemistry("2H2 + O2 → 2H2O").unwrap();
        assert!(is_reaction);
        assert_eq!(rendered.latex, r"\ce{2H2 + O2 -> 2H2O}");
        assert!(rendered.mathml.contains("<mo>→</mo>"));
        assert_eq!(elements[0].symbol, "H");
        assert_eq!(elements[0].count, 4);

        // Totals across species saturate instead of overflowing
        let (_, elements, _) = render_chemistry("H4000000000 + H4000000000").unwrap();
        assert_eq!(elements, vec![ElementCount { symbol: "H".into(), count: u32::MAX }]);
    }

    #[test]
    fn test_chemistry_parenthesized_group() {
        let (_, elements, _) = render_chemistry("Ca(OH)2").unwrap();
        let oxygen = elements.iter().find(|e| e.symbol == "O").unwrap();
        assert_eq!(oxygen.count, 2);
    }

    #[test]
    fn test_chemistry_unknown_symbol() {
        let err = render_chemistry("Xq2").unwrap_err();
        assert!(err.0.contains("unknown element symbol 'Xq'"));
        assert!(render_chemistry("A4").is_err());
    }

    #[test]
    fn test_physics_scientific_notation() {
        let rendered = render_physics("c", "3.0×10^8", Some("m/s")).unwrap();
        assert_eq!(rendered.latex, r"c = 3.0 \times 10^{8}\,\mathrm{m/s}");
        assert!(rendered.mathml.contains("<msup><mn>10</mn><mn>8</mn></msup>"));

        let rendered = render_physics("E", "1.6e-19", Some("J")).unwrap();
        assert_eq!(rendered.latex, r"E = 1.6 \times 10^{-19}\,\mathrm{J}");
    }

    #[test]
    fn test_physics_plain_value() {
        let rendered = render_physics("v", "12.5", None).unwrap();
        assert_eq!(rendered.latex, "v = 12.5");
    }

    #[test]
    fn test_known_units() {
        assert!(is_known_unit("m/s"));
        assert!(is_known_unit("m/s^2"));
        assert!(is_known_unit("kg"));
        assert!(is_known_unit("km/h"));
        assert!(is_known_unit("kΩ"));
        assert!(!is_known_unit("apples"));
        assert!(!is_known_unit(""));
    }
}
