//! Formula detection, rendering and placeholder substitution

mod detector;
mod placeholder;
pub mod render;
mod types;

pub use detector::{FormulaDetector, FormulaScan};
pub use placeholder::{substitute, PlaceholderEntry, PlaceholderMap, RestoreFormat, Restored};
pub use render::ConversionError;
pub use types::{ElementCount, Formula, FormulaDetails, FormulaKind};
