//! Color conversions and WCAG contrast
//!
//! All colors entering the theme engine go through [`HexColor`], which only
//! accepts the strict `#RRGGBB` form. The free functions mirror the operations
//! the settings UI and the CSS applicator need:
//!
//! - [`hex_to_hsl`] / [`hsl_to_hex`] for hue arithmetic
//! - [`relative_luminance`] / [`contrast_ratio`] per WCAG 2.1
//! - [`get_text_color_for_background`] for foreground selection
//! - [`darken`] / [`lighten`] for hover shades
//!
//! # Example
//!
//! ```rust
//! use brand_color::{contrast_ratio, hex_to_hsl, HexColor};
//!
//! let hsl = hex_to_hsl("#2563eb").unwrap();
//! assert_eq!(hsl.h.round(), 221.0);
//!
//! let ratio = contrast_ratio(HexColor::BLACK, HexColor::WHITE);
//! assert!((ratio - 21.0).abs() < 1e-9);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::{ColorError, Result};

// =============================================================================
// Hex Colors
// =============================================================================

fn hex_pattern() -> &'static Regex {
    static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
    HEX_REGEX.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap())
}

/// A validated 6-digit sRGB hex color
///
/// Parsing is strict (`#RRGGBB`, no shorthand, no alpha, no surrounding
/// whitespace). Formatting always produces lowercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

impl HexColor {
    /// Pure white
    pub const WHITE: HexColor = HexColor::from_rgb(0xff, 0xff, 0xff);

    /// Pure black
    pub const BLACK: HexColor = HexColor::from_rgb(0x00, 0x00, 0x00);

    /// Build a color from 8-bit channels
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string
    pub fn parse(input: &str) -> Result<Self> {
        if !hex_pattern().is_match(input) {
            return Err(ColorError::MalformedHex(input.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&input[range], 16)
                .map_err(|_| ColorError::MalformedHex(input.to_string()))
        };
        Ok(Self {
            r: channel(1..3)?,
            g: channel(3..5)?,
            b: channel(5..7)?,
        })
    }

    /// Check whether a string is a well-formed `#RRGGBB` color
    pub fn is_valid(input: &str) -> bool {
        hex_pattern().is_match(input)
    }

    /// Get the 8-bit channels
    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Convert to HSL
    pub fn to_hsl(&self) -> Hsl {
        rgb_to_hsl(self.r, self.g, self.b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

// =============================================================================
// HSL
// =============================================================================

/// A color in HSL space
///
/// `h` is in degrees `[0, 360)`, `s` and `l` are percentages `[0, 100]`.
/// Components are kept unrounded so conversions back to hex are lossless up
/// to 8-bit quantization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees
    pub h: f64,
    /// Saturation percentage
    pub s: f64,
    /// Lightness percentage
    pub l: f64,
}

impl Hsl {
    /// Create a new HSL value, normalizing hue and clamping percentages
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    /// Rotate the hue by `degrees`
    pub fn rotate(&self, degrees: f64) -> Self {
        Self::new(self.h + degrees, self.s, self.l)
    }

    /// Replace the lightness
    pub fn with_lightness(&self, l: f64) -> Self {
        Self::new(self.h, self.s, l)
    }

    /// Convert to a hex color
    pub fn to_hex(&self) -> HexColor {
        hsl_to_hex(self.h, self.s, self.l)
    }

    /// Format as a Tailwind-style space separated triplet: `"221 83% 53%"`
    pub fn to_triplet(&self) -> String {
        let h = self.h.round() as i64 % 360;
        format!("{} {}% {}%", h, self.s.round() as i64, self.l.round() as i64)
    }
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;

    if d == 0.0 {
        return Hsl { h: 0.0, s: 0.0, l: l * 100.0 };
    }

    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl {
        h: (h * 60.0).rem_euclid(360.0),
        s: s * 100.0,
        l: l * 100.0,
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert a hex string to HSL
///
/// Returns `None` for anything that is not a strict `#RRGGBB` string; callers
/// keep their previous or default value in that case.
pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    HexColor::parse(hex).ok().map(|color| color.to_hsl())
}

/// Convert HSL components to a hex color
///
/// Hue wraps around, saturation and lightness are clamped to `[0, 100]`.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> HexColor {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 100.0) / 100.0;
    let l = l.clamp(0.0, 100.0) / 100.0;

    if s == 0.0 {
        let v = to_channel(l);
        return HexColor::from_rgb(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    HexColor::from_rgb(
        to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_rgb(p, q, h)),
        to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

// =============================================================================
// Luminance & Contrast
// =============================================================================

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG 2.1 relative luminance in `[0, 1]`
pub fn relative_luminance(color: HexColor) -> f64 {
    let (r, g, b) = color.rgb();
    0.2126 * linearize(r) + 0.7152 * linearize(g) + 0.0722 * linearize(b)
}

/// WCAG contrast ratio between two colors, in `[1, 21]`
///
/// The result does not depend on argument order.
pub fn contrast_ratio(a: HexColor, b: HexColor) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pick pure white or pure black, whichever reads better on `background`
///
/// Ties go to white.
pub fn get_text_color_for_background(background: HexColor) -> HexColor {
    let on_white = contrast_ratio(background, HexColor::WHITE);
    let on_black = contrast_ratio(background, HexColor::BLACK);
    if on_white >= on_black {
        HexColor::WHITE
    } else {
        HexColor::BLACK
    }
}

fn shift_channels(color: HexColor, amount: f64, sign: i16) -> HexColor {
    let step = (255.0 * amount.clamp(0.0, 1.0)).round() as i16 * sign;
    let shift = |c: u8| (i16::from(c) + step).clamp(0, 255) as u8;
    let (r, g, b) = color.rgb();
    HexColor::from_rgb(shift(r), shift(g), shift(b))
}

/// Darken each channel by `round(255 * amount)`, clamped at 0
pub fn darken(color: HexColor, amount: f64) -> HexColor {
    shift_channels(color, amount, -1)
}

/// Lighten each channel by `round(255 * amount)`, clamped at 255
pub fn lighten(color: HexColor, amount: f64) -> HexColor {
    shift_channels(color, amount, 1)
}

// =============================================================================
// Contrast Rating
// =============================================================================

/// WCAG conformance level for normal-size text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Ratio of at least 7:1
    #[serde(rename = "AAA")]
    Aaa,
    /// Ratio of at least 4.5:1
    #[serde(rename = "AA")]
    Aa,
    /// Below 4.5:1
    Fail,
}

impl WcagLevel {
    /// Display label used by the settings UI
    pub fn as_str(&self) -> &'static str {
        match self {
            WcagLevel::Aaa => "AAA",
            WcagLevel::Aa => "AA",
            WcagLevel::Fail => "Fail",
        }
    }
}

/// Rating for a contrast ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastRating {
    /// Conformance level
    pub level: WcagLevel,
    /// Whether the ratio passes AA for normal text
    pub accessible: bool,
}

/// Rate a contrast ratio against the WCAG thresholds
pub fn get_contrast_rating(ratio: f64) -> ContrastRating {
    let level = if ratio >= 7.0 {
        WcagLevel::Aaa
    } else if ratio >= 4.5 {
        WcagLevel::Aa
    } else {
        WcagLevel::Fail
    };
    ContrastRating {
        level,
        accessible: ratio >= 4.5,
    }
}
