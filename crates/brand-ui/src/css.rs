//! Custom property derivation
//!
//! Property names here are a contract with every styled component in the
//! portal (buttons, badges, nav). Renaming one requires a coordinated
//! migration of the stylesheets.
//!
//! | Property | Value |
//! |---|---|
//! | `--brand-color` | primary hex |
//! | `--brand-color-hover` | primary darkened by 10% |
//! | `--brand-color-foreground` | white or black hex, whichever reads better on the primary |
//! | `--brand-secondary` | secondary hex |
//! | `--primary` | Tailwind HSL triplet with mode-clamped lightness |
//! | `--primary-foreground` | Tailwind HSL triplet of the text color for `--primary` |
//! | `--ring` | `--primary`, 5 points darker in dark mode |
//! | `--brand-font` | brand font family |

use brand_client::BrandTheme;
use brand_color::{darken, get_text_color_for_background, HexColor};
use std::collections::BTreeMap;

/// Primary brand color
pub const BRAND_COLOR: &str = "--brand-color";
/// Hover shade of the primary
pub const BRAND_COLOR_HOVER: &str = "--brand-color-hover";
/// Text color on the primary
pub const BRAND_COLOR_FOREGROUND: &str = "--brand-color-foreground";
/// Secondary brand color
pub const BRAND_SECONDARY: &str = "--brand-secondary";
/// Tailwind primary triplet
pub const PRIMARY: &str = "--primary";
/// Tailwind primary foreground triplet
pub const PRIMARY_FOREGROUND: &str = "--primary-foreground";
/// Tailwind focus ring triplet
pub const RING: &str = "--ring";
/// Brand font family
pub const BRAND_FONT: &str = "--brand-font";

/// Every property the engine may write
pub const ALL_PROPERTIES: [&str; 8] = [
    BRAND_COLOR,
    BRAND_COLOR_HOVER,
    BRAND_COLOR_FOREGROUND,
    BRAND_SECONDARY,
    PRIMARY,
    PRIMARY_FOREGROUND,
    RING,
    BRAND_FONT,
];

/// Hover shade amount
pub const HOVER_DARKEN: f64 = 0.10;

/// Light mode caps `--primary` lightness here
pub const LIGHT_MAX_LIGHTNESS: f64 = 53.0;

/// Dark mode floors `--primary` lightness here
pub const DARK_MIN_LIGHTNESS: f64 = 65.0;

/// Dark mode lifts the source lightness by this much
pub const DARK_LIGHTNESS_BOOST: f64 = 15.0;

/// Dark mode `--ring` sits this far below `--primary`
pub const DARK_RING_OFFSET: f64 = 5.0;

/// Page color mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Light page background
    #[default]
    Light,
    /// Dark page background
    Dark,
}

impl ColorMode {
    /// Mode from an `is_dark` flag
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    /// Whether this is dark mode
    pub fn is_dark(&self) -> bool {
        matches!(self, ColorMode::Dark)
    }
}

/// A set of custom properties, keyed by property name
pub type CssProperties = BTreeMap<String, String>;

/// Lightness used for `--primary` in the given mode
pub fn clamp_primary_lightness(l: f64, mode: ColorMode) -> f64 {
    match mode {
        ColorMode::Light => l.min(LIGHT_MAX_LIGHTNESS),
        ColorMode::Dark => (l + DARK_LIGHTNESS_BOOST).clamp(DARK_MIN_LIGHTNESS, 100.0),
    }
}

/// Derive the properties for a set of brand colors
///
/// Absent colors produce no properties; nothing is ever written as an empty
/// string. A blank font family is treated as absent.
pub fn derive_properties(
    primary: Option<HexColor>,
    secondary: Option<HexColor>,
    font_family: Option<&str>,
    mode: ColorMode,
) -> CssProperties {
    let mut props = CssProperties::new();

    if let Some(primary) = primary {
        props.insert(BRAND_COLOR.to_string(), primary.to_string());
        props.insert(BRAND_COLOR_HOVER.to_string(), darken(primary, HOVER_DARKEN).to_string());
        props.insert(
            BRAND_COLOR_FOREGROUND.to_string(),
            get_text_color_for_background(primary).to_string(),
        );

        let hsl = primary.to_hsl();
        let clamped = hsl.with_lightness(clamp_primary_lightness(hsl.l, mode));
        let foreground = get_text_color_for_background(clamped.to_hex());
        let ring = if mode.is_dark() {
            clamped.with_lightness(clamped.l - DARK_RING_OFFSET)
        } else {
            clamped
        };

        props.insert(PRIMARY.to_string(), clamped.to_triplet());
        props.insert(PRIMARY_FOREGROUND.to_string(), hsl_triplet(foreground));
        props.insert(RING.to_string(), ring.to_triplet());
    }

    if let Some(secondary) = secondary {
        props.insert(BRAND_SECONDARY.to_string(), secondary.to_string());
    }

    if let Some(font) = font_family.map(str::trim).filter(|f| !f.is_empty()) {
        props.insert(BRAND_FONT.to_string(), font.to_string());
    }

    props
}

/// Derive the properties for a whole theme
pub fn derive_theme_properties(theme: &BrandTheme, mode: ColorMode) -> CssProperties {
    derive_properties(
        theme.primary_color,
        theme.secondary_color,
        theme.font_family.as_deref(),
        mode,
    )
}

/// HSL triplet of a hex color, as written to Tailwind variables
pub fn hsl_triplet(color: HexColor) -> String {
    color.to_hsl().to_triplet()
}
