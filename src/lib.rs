//! White-label theme resolution for the brand portal
//!
//! Facade over the workspace crates:
//!
//! - [`brand_color`] - hex/HSL math, WCAG contrast, secondary color suggestions
//! - [`brand_client`] - the brand theme record and the brand API client
//! - [`brand_ui`] - CSS custom property derivation, application and preview
//! - [`brand_state`] - cached resolution and the [`ThemeController`] facade
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brand_portal::{
//!     BrandApiClient, BrandApiConfig, MemoryDocument, ResolutionContext, ThemeConfig,
//!     ThemeController,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! brand_portal::init_tracing("info");
//!
//! let client = BrandApiClient::new(BrandApiConfig::new("https://portal.example.com"))?;
//! let document = Arc::new(MemoryDocument::new());
//! let controller = ThemeController::new(client, document.clone(), ThemeConfig::default());
//!
//! controller.resolve(&ResolutionContext::host("acme.example.com")).await;
//! println!("{:?}", document.property("--brand-color"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use brand_client::{BrandApiClient, BrandApiConfig, BrandApiError, BrandTheme, TenantId};
pub use brand_color::{
    contrast_ratio, darken, get_contrast_rating, get_text_color_for_background, hex_to_hsl,
    hsl_to_hex, lighten, relative_luminance, suggest_secondary_color, ColorSuggestion,
    ContrastRating, HexColor, Hsl, SuggestOptions, WcagLevel,
};
pub use brand_state::{
    BrandSource, ConfigError, ContextProvider, Resolution, ResolutionContext, ResolutionSource,
    ResolverState, StaticContext, ThemeConfig, ThemeController, ThemeResolver,
};
pub use brand_ui::{
    css, AppliedPaletteSnapshot, ColorMode, CssVariableApplicator, Document, FaviconSlot,
    MemoryDocument, PaletteSource, PreviewColors, PreviewOverlay, Priority, StyleSink,
};

pub use brand_client;
pub use brand_color;
pub use brand_state;
pub use brand_ui;

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
