//! CSS variable applicator
//!
//! Owns the [`ThemeRuntimeState`] for one document: which custom properties
//! are currently applied and which layer wrote them. Every write is tagged
//! with a [`PaletteSource`]. While a preview is active, `Resolved` writes are
//! suppressed so a background resolution can never paint over the preview,
//! regardless of arrival order.

use brand_client::BrandTheme;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::css::{self, ColorMode, CssProperties};
use crate::document::{Document, Priority};

/// Which layer produced a set of applied properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    /// Written from a resolved (persisted) theme
    Resolved,
    /// Written by the preview overlay
    Preview,
}

/// The custom properties applied to the root element at some instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPaletteSnapshot {
    /// Layer that wrote the properties (`None` before the first write)
    pub source: Option<PaletteSource>,
    /// Property name to value
    pub properties: CssProperties,
}

impl AppliedPaletteSnapshot {
    /// Value of one property
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// Mutable theme state for one document
#[derive(Debug, Clone, Default)]
pub struct ThemeRuntimeState {
    /// Properties currently on the root element
    pub applied: CssProperties,
    /// Layer that last wrote
    pub source: Option<PaletteSource>,
    /// Whether the preview layer is authoritative
    pub preview_active: bool,
    /// Current page color mode
    pub mode: ColorMode,
}

/// Writes brand palettes onto a [`Document`]
pub struct CssVariableApplicator<D: Document> {
    document: Arc<D>,
    state: Mutex<ThemeRuntimeState>,
}

impl<D: Document> CssVariableApplicator<D> {
    /// Create an applicator for a document
    pub fn new(document: Arc<D>) -> Self {
        Self {
            document,
            state: Mutex::new(ThemeRuntimeState::default()),
        }
    }

    /// Create an applicator starting in the given color mode
    pub fn with_mode(document: Arc<D>, mode: ColorMode) -> Self {
        let applicator = Self::new(document);
        applicator.state.lock().mode = mode;
        applicator
    }

    /// The underlying document
    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    /// Current color mode
    pub fn mode(&self) -> ColorMode {
        self.state.lock().mode
    }

    /// Change the color mode
    ///
    /// Does not rewrite anything by itself; callers re-apply the active layer.
    pub fn set_mode(&self, mode: ColorMode) {
        self.state.lock().mode = mode;
    }

    /// Whether the preview layer is authoritative
    pub fn is_preview_active(&self) -> bool {
        self.state.lock().preview_active
    }

    /// Copy of the runtime state
    pub fn runtime_state(&self) -> ThemeRuntimeState {
        self.state.lock().clone()
    }

    /// Snapshot of the currently applied properties
    pub fn snapshot(&self) -> AppliedPaletteSnapshot {
        let state = self.state.lock();
        AppliedPaletteSnapshot {
            source: state.source,
            properties: state.applied.clone(),
        }
    }

    /// Apply a resolved theme: colors, font and favicon
    ///
    /// Returns `false` if the write was suppressed by an active preview.
    pub async fn apply(&self, theme: &BrandTheme, mode: ColorMode) -> bool {
        self.set_mode(mode);
        if !self.apply_colors(theme, mode) {
            return false;
        }
        self.update_favicon(theme.favicon_url.as_deref()).await;
        true
    }

    /// Apply a resolved theme's colors and font, leaving the favicon alone
    pub fn apply_colors(&self, theme: &BrandTheme, mode: ColorMode) -> bool {
        let props = css::derive_theme_properties(theme, mode);
        self.write(PaletteSource::Resolved, props)
    }

    /// Write a set of properties on behalf of a layer
    ///
    /// Properties the engine previously wrote but that are missing from
    /// `props` are removed, so one tenant's colors never linger under
    /// another's. Returns `false` when a `Resolved` write is suppressed.
    pub fn write(&self, source: PaletteSource, props: CssProperties) -> bool {
        let mut state = self.state.lock();

        if source == PaletteSource::Resolved && state.preview_active {
            tracing::debug!("Preview active, suppressing resolved palette write");
            return false;
        }

        let priority = match source {
            PaletteSource::Resolved => Priority::Normal,
            PaletteSource::Preview => Priority::Important,
        };
        self.replace_locked(&mut state, source, props, priority);
        true
    }

    /// Enter the preview layer and capture the properties it will restore
    pub(crate) fn begin_preview(&self) -> AppliedPaletteSnapshot {
        let mut state = self.state.lock();
        state.preview_active = true;
        AppliedPaletteSnapshot {
            source: state.source,
            properties: state.applied.clone(),
        }
    }

    /// Leave the preview layer, putting `snapshot` back verbatim
    pub(crate) fn end_preview(&self, snapshot: &AppliedPaletteSnapshot) {
        let mut state = self.state.lock();
        state.preview_active = false;
        let source = snapshot.source.unwrap_or(PaletteSource::Resolved);
        self.replace_locked(&mut state, source, snapshot.properties.clone(), Priority::Normal);
        state.source = snapshot.source;
    }

    fn replace_locked(
        &self,
        state: &mut ThemeRuntimeState,
        source: PaletteSource,
        props: CssProperties,
        priority: Priority,
    ) {
        for name in state.applied.keys() {
            if !props.contains_key(name) {
                self.document.remove_property(name);
            }
        }
        for (name, value) in &props {
            self.document.set_property(name, value, priority);
        }

        let font_changed = state.applied.get(css::BRAND_FONT) != props.get(css::BRAND_FONT);
        if font_changed {
            self.document
                .set_body_font(props.get(css::BRAND_FONT).map(String::as_str));
        }

        state.applied = props;
        state.source = Some(source);
    }

    /// Point the favicon at `url`, or remove it when absent
    ///
    /// If the icon fails to load, the link is removed so the browser default
    /// shows instead of a broken image.
    pub async fn update_favicon(&self, url: Option<&str>) {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            self.document.remove_icon();
            return;
        };

        self.document.replace_icon(url);
        if self.document.probe(url).await {
            return;
        }

        tracing::warn!("Favicon failed to load, falling back to browser default: {}", url);
        // A newer theme may have replaced the link while we were probing
        if self.document.current_icon().as_deref() == Some(url) {
            self.document.remove_icon();
        }
    }
}
