//! Secondary color suggestions
//!
//! Given an admin-supplied primary color, proposes a short list of secondary
//! colors from classic color-wheel relationships plus a neutral fallback.
//! Every suggestion carries its contrast ratio against white so the picker can
//! show an accessibility badge via [`get_contrast_rating`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::color::{
    contrast_ratio, get_contrast_rating, hex_to_hsl, ContrastRating, HexColor, Hsl,
};

/// Gray that is always offered, whatever the primary
pub const NEUTRAL_GRAY: HexColor = HexColor::from_rgb(0x9c, 0xa3, 0xaf);

/// Upper bound on the number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 6;

/// A proposed secondary color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSuggestion {
    /// The suggested color
    pub color: HexColor,
    /// Short label for the picker
    pub label: String,
    /// One-line explanation of the relationship to the primary
    pub description: String,
    /// Contrast ratio against white
    pub contrast_ratio: f64,
}

impl ColorSuggestion {
    fn new(color: HexColor, label: &str, description: &str) -> Self {
        Self {
            color,
            label: label.to_string(),
            description: description.to_string(),
            contrast_ratio: contrast_ratio(color, HexColor::WHITE),
        }
    }

    /// WCAG rating of this suggestion against white
    pub fn rating(&self) -> ContrastRating {
        get_contrast_rating(self.contrast_ratio)
    }
}

/// Options for [`suggest_secondary_color`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Sort by descending contrast instead of family order
    pub prefer_high_contrast: bool,
}

fn derived(
    base: Hsl,
    h_shift: f64,
    s: f64,
    l: f64,
    label: &str,
    description: &str,
) -> ColorSuggestion {
    // Hues are snapped to whole degrees before quantizing to hex
    let h = (base.h + h_shift).round();
    ColorSuggestion::new(Hsl::new(h, s, l).to_hex(), label, description)
}

/// Suggest secondary colors for a primary color
///
/// Candidates, in family order: complementary, two analogous, two triadic, a
/// muted neutral on the primary's hue, and [`NEUTRAL_GRAY`]. Candidates that
/// quantize to the same color are collapsed, and the list is capped at
/// [`MAX_SUGGESTIONS`] without ever dropping the neutral gray. When the cap
/// bites, the second analogous hue is the one left out, so every family
/// keeps at least one entry.
///
/// A malformed primary yields an empty list.
///
/// # Example
///
/// ```rust
/// use brand_color::{suggest_secondary_color, SuggestOptions};
///
/// let suggestions = suggest_secondary_color("#2563eb", SuggestOptions::default());
/// assert!(suggestions.iter().any(|s| s.color.to_string() == "#9ca3af"));
/// assert!(suggest_secondary_color("nope", SuggestOptions::default()).is_empty());
/// ```
pub fn suggest_secondary_color(primary: &str, opts: SuggestOptions) -> Vec<ColorSuggestion> {
    let Some(base) = hex_to_hsl(primary) else {
        return Vec::new();
    };

    let (s, l) = (base.s, base.l);
    let muted = (s - 15.0).max(10.0);
    let neighbor = "Neighboring hue, slightly softer";
    // (candidate, first to go when over the cap)
    let candidates = [
        (derived(base, 180.0, s, l, "Complementary", "Opposite hue on the color wheel"), false),
        (derived(base, 30.0, muted, l, "Analogous +30°", neighbor), false),
        (derived(base, -30.0, muted, l, "Analogous -30°", neighbor), true),
        (derived(base, 120.0, s, l, "Triadic +120°", "One third around the color wheel"), false),
        (derived(base, 240.0, s, l, "Triadic +240°", "Two thirds around the color wheel"), false),
        (
            derived(base, 0.0, 10.0, 50.0, "Muted neutral", "Gray tinted with the primary hue"),
            false,
        ),
    ];

    let mut seen = HashSet::from([NEUTRAL_GRAY]);
    let mut kept: Vec<(ColorSuggestion, bool)> = candidates
        .into_iter()
        .filter(|(candidate, _)| seen.insert(candidate.color))
        .collect();
    if kept.len() >= MAX_SUGGESTIONS {
        if let Some(at) = kept.iter().position(|(_, spare)| *spare) {
            kept.remove(at);
        }
    }
    let mut suggestions: Vec<ColorSuggestion> =
        kept.into_iter().map(|(candidate, _)| candidate).collect();

    if opts.prefer_high_contrast {
        suggestions.sort_by(|a, b| b.contrast_ratio.total_cmp(&a.contrast_ratio));
    }
    suggestions.truncate(MAX_SUGGESTIONS - 1);

    let gray = ColorSuggestion::new(
        NEUTRAL_GRAY,
        "Neutral gray",
        "Safe neutral that pairs with any primary",
    );
    if opts.prefer_high_contrast {
        let at = suggestions
            .iter()
            .position(|s| s.contrast_ratio < gray.contrast_ratio)
            .unwrap_or(suggestions.len());
        suggestions.insert(at, gray);
    } else {
        suggestions.push(gray);
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complementary_for_brand_blue() {
        let suggestions = suggest_secondary_color("#2563eb", SuggestOptions::default());
        let complementary = suggestions.iter().find(|s| s.label == "Complementary").unwrap();

        let hue = complementary.color.to_hsl().h;
        assert!((hue - 41.0).abs() <= 1.5, "complementary hue was {}", hue);
        assert_eq!(suggestions[0].label, "Complementary");
    }

    #[test]
    fn test_neutral_gray_always_present() {
        for primary in ["#2563eb", "#000000", "#ffffff", "#9ca3af", "#ff0000", "#14b8a6"] {
            for prefer_high_contrast in [false, true] {
                let opts = SuggestOptions { prefer_high_contrast };
                let suggestions = suggest_secondary_color(primary, opts);
                assert!(
                    suggestions.iter().any(|s| s.color == NEUTRAL_GRAY),
                    "gray missing for {}",
                    primary
                );
                assert!(suggestions.len() <= MAX_SUGGESTIONS);
            }
        }
    }

    #[test]
    fn test_malformed_primary_returns_empty() {
        assert!(suggest_secondary_color("not-a-color", SuggestOptions::default()).is_empty());
        let opts = SuggestOptions { prefer_high_contrast: true };
        assert!(suggest_secondary_color("#abc", opts).is_empty());
    }

    #[test]
    fn test_family_order_by_default() {
        let suggestions = suggest_secondary_color("#2563eb", SuggestOptions::default());
        let labels: Vec<&str> = suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Complementary",
                "Analogous +30°",
                "Triadic +120°",
                "Triadic +240°",
                "Muted neutral",
                "Neutral gray",
            ]
        );
    }

    #[test]
    fn test_every_family_survives_the_cap() {
        for primary in ["#2563eb", "#ff0000", "#14b8a6", "#7c3aed"] {
            for prefer_high_contrast in [false, true] {
                let opts = SuggestOptions { prefer_high_contrast };
                let suggestions = suggest_secondary_color(primary, opts);
                assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
                for label in ["Complementary", "Analogous +30°", "Muted neutral", "Neutral gray"] {
                    assert!(
                        suggestions.iter().any(|s| s.label == label),
                        "{} missing for {}",
                        label,
                        primary
                    );
                }
                assert!(suggestions.iter().all(|s| s.label != "Analogous -30°"));
            }
        }
    }

    #[test]
    fn test_high_contrast_sorted_descending() {
        let opts = SuggestOptions { prefer_high_contrast: true };
        let suggestions = suggest_secondary_color("#2563eb", opts);
        for pair in suggestions.windows(2) {
            assert!(pair[0].contrast_ratio >= pair[1].contrast_ratio);
        }
    }

    #[test]
    fn test_grayscale_primary_is_deduplicated() {
        // Hue rotations of a gray are the same gray
        let suggestions = suggest_secondary_color("#808080", SuggestOptions::default());
        let mut colors: Vec<HexColor> = suggestions.iter().map(|s| s.color).collect();
        let total = colors.len();
        colors.sort_by_key(|c| c.rgb());
        colors.dedup();
        assert_eq!(colors.len(), total);
        assert!(total < MAX_SUGGESTIONS);
    }

    #[test]
    fn test_contrast_ratio_is_against_white() {
        for suggestion in suggest_secondary_color("#14b8a6", SuggestOptions::default()) {
            let expected = contrast_ratio(suggestion.color, HexColor::WHITE);
            assert_eq!(suggestion.contrast_ratio, expected);
            assert_eq!(suggestion.rating(), get_contrast_rating(expected));
        }
    }

    #[test]
    fn test_suggestion_json_shape() {
        let suggestion = &suggest_secondary_color("#2563eb", SuggestOptions::default())[0];
        let json = serde_json::to_value(suggestion).unwrap();
        assert!(json.get("contrastRatio").is_some());
        assert!(json["color"].as_str().unwrap().starts_with('#'));
    }
}
