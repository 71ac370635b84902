//! Brand color math for the white-label portal
//!
//! This crate holds the pure, stateless half of the theme engine: hex/HSL
//! conversion, WCAG contrast calculations, shading helpers and the
//! secondary-color suggester used by the branding settings form.
//!
//! Nothing in here performs I/O or keeps state, so every function can be
//! called from a debounced UI handler without coordination.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod palette;

pub use color::{
    contrast_ratio, darken, get_contrast_rating, get_text_color_for_background, hex_to_hsl,
    hsl_to_hex, lighten, relative_luminance, ContrastRating, HexColor, Hsl, WcagLevel,
};
pub use palette::{suggest_secondary_color, ColorSuggestion, SuggestOptions};

/// Result type for color operations
pub type Result<T> = std::result::Result<T, ColorError>;

/// Color errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// Input does not match `#RRGGBB`
    #[error("Malformed hex color: {0:?}")]
    MalformedHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ColorError::MalformedHex("blue".to_string());
        assert!(err.to_string().contains("Malformed hex color"));
        assert!(err.to_string().contains("blue"));
    }
}
