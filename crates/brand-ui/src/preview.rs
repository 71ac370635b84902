//! Live preview overlay
//!
//! While an administrator edits brand colors, the proposed palette is written
//! as `!important` properties on top of the resolved theme. Entering captures
//! a snapshot of what was applied; exiting puts that snapshot back verbatim.

use brand_client::BrandTheme;
use brand_color::HexColor;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::applicator::{AppliedPaletteSnapshot, CssVariableApplicator, PaletteSource};
use crate::css;
use crate::document::Document;

/// Proposed colors for a preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewColors {
    /// Proposed primary
    pub primary: Option<HexColor>,
    /// Proposed secondary
    pub secondary: Option<HexColor>,
}

impl PreviewColors {
    /// Build from raw editor input
    ///
    /// Values that are not valid hex colors are treated as absent, so a
    /// half-typed `#25` simply leaves that slot unset.
    pub fn from_input(primary: Option<&str>, secondary: Option<&str>) -> Self {
        Self {
            primary: primary.and_then(|s| HexColor::parse(s).ok()),
            secondary: secondary.and_then(|s| HexColor::parse(s).ok()),
        }
    }

    /// Colors taken from a theme
    pub fn from_theme(theme: &BrandTheme) -> Self {
        Self {
            primary: theme.primary_color,
            secondary: theme.secondary_color,
        }
    }
}

#[derive(Debug, Clone)]
struct PreviewSession {
    snapshot: AppliedPaletteSnapshot,
    proposal: PreviewColors,
    font_family: Option<String>,
}

/// Preview layer over a [`CssVariableApplicator`]
pub struct PreviewOverlay<D: Document> {
    applicator: Arc<CssVariableApplicator<D>>,
    session: Mutex<Option<PreviewSession>>,
}

impl<D: Document> PreviewOverlay<D> {
    /// Create an overlay for an applicator
    pub fn new(applicator: Arc<CssVariableApplicator<D>>) -> Self {
        Self {
            applicator,
            session: Mutex::new(None),
        }
    }

    /// Whether a preview session is open
    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Current proposal, if previewing
    pub fn proposal(&self) -> Option<PreviewColors> {
        self.session.lock().as_ref().map(|s| s.proposal)
    }

    /// Snapshot that exit will restore, if previewing
    pub fn restore_snapshot(&self) -> Option<AppliedPaletteSnapshot> {
        self.session.lock().as_ref().map(|s| s.snapshot.clone())
    }

    /// Open a preview seeded from `theme`
    ///
    /// Entering twice keeps the first snapshot. Returns the snapshot that
    /// exit will restore.
    pub fn enter(&self, theme: &BrandTheme) -> AppliedPaletteSnapshot {
        let mut session = self.session.lock();
        if let Some(existing) = session.as_ref() {
            return existing.snapshot.clone();
        }

        let snapshot = self.applicator.begin_preview();
        let opened = PreviewSession {
            snapshot: snapshot.clone(),
            proposal: PreviewColors::from_theme(theme),
            font_family: theme.font_family.clone(),
        };
        self.write_locked(&opened);
        *session = Some(opened);

        tracing::debug!("Entered brand preview");
        snapshot
    }

    /// Merge proposed colors into the preview
    ///
    /// Absent slots keep their previous proposal, so a primary-only update
    /// leaves the secondary alone and a half-typed color keeps the last valid
    /// one. Every call re-asserts the full preview palette, so a resolution
    /// that slipped through between updates is overwritten. Returns `false`
    /// when no preview is open.
    pub fn update(&self, colors: PreviewColors) -> bool {
        let mut session = self.session.lock();
        let Some(active) = session.as_mut() else {
            tracing::debug!("Ignoring preview update outside a preview session");
            return false;
        };
        if let Some(primary) = colors.primary {
            active.proposal.primary = Some(primary);
        }
        if let Some(secondary) = colors.secondary {
            active.proposal.secondary = Some(secondary);
        }
        self.write_locked(active);
        true
    }

    /// Rewrite the current proposal, e.g. after a color mode change
    pub fn reassert(&self) -> bool {
        let session = self.session.lock();
        match session.as_ref() {
            Some(active) => {
                self.write_locked(active);
                true
            }
            None => false,
        }
    }

    /// Replace the snapshot exit will restore
    ///
    /// Used when the persisted theme changes underneath an open preview.
    pub fn rebase(&self, snapshot: AppliedPaletteSnapshot) -> bool {
        match self.session.lock().as_mut() {
            Some(active) => {
                active.snapshot = snapshot;
                true
            }
            None => false,
        }
    }

    /// Close the preview and restore the snapshot taken on entry
    ///
    /// Returns `false` when no preview was open.
    pub fn exit(&self) -> bool {
        let mut session = self.session.lock();
        let Some(closed) = session.take() else {
            return false;
        };
        self.applicator.end_preview(&closed.snapshot);
        tracing::debug!("Exited brand preview");
        true
    }

    fn write_locked(&self, session: &PreviewSession) {
        let props = css::derive_properties(
            session.proposal.primary,
            session.proposal.secondary,
            session.font_family.as_deref(),
            self.applicator.mode(),
        );
        self.applicator.write(PaletteSource::Preview, props);
    }
}
