//! Structural element detection

mod detector;
mod types;

pub use detector::{LayoutDetector, LayoutOptions};
pub use types::{ElementMetadata, ElementType, HeadingStyle, LayoutElement, ListMarker};
