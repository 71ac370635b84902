//! Applying brand themes to the document
//!
//! This crate turns a [`BrandTheme`](brand_client::BrandTheme) into CSS custom
//! properties on the root element and a favicon link in the document head.
//!
//! # Modules
//!
//! - [`document`] - The style sink / favicon slot seam and an in-memory document
//! - [`css`] - Custom property names and their derivation from brand colors
//! - [`applicator`] - Writes derived properties, tagging each write by source
//! - [`preview`] - Temporary, non-persisted preview layer with exact restore
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brand_client::BrandTheme;
//! use brand_color::HexColor;
//! use brand_ui::{css, ColorMode, CssVariableApplicator, MemoryDocument};
//!
//! let document = Arc::new(MemoryDocument::new());
//! let applicator = CssVariableApplicator::new(document.clone());
//! let theme = BrandTheme::new("Acme").with_primary(HexColor::from_rgb(0x25, 0x63, 0xeb));
//!
//! applicator.apply_colors(&theme, ColorMode::Light);
//! assert_eq!(document.property(css::BRAND_COLOR).as_deref(), Some("#2563eb"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod applicator;
pub mod css;
pub mod document;
pub mod preview;

pub use applicator::{
    AppliedPaletteSnapshot, CssVariableApplicator, PaletteSource, ThemeRuntimeState,
};
pub use css::{ColorMode, CssProperties};
pub use document::{Document, FaviconSlot, MemoryDocument, Priority, StyleSink};
pub use preview::{PreviewColors, PreviewOverlay};
