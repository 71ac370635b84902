//! Theme controller
//!
//! The one object the rest of the application talks to for theming. It owns
//! the resolver, the applicator for the page's document and the preview
//! layer, and publishes the current resolved theme through a watch channel
//! for UI binding.

use brand_client::BrandTheme;
use brand_color::{suggest_secondary_color, ColorSuggestion, SuggestOptions};
use brand_ui::{
    css, AppliedPaletteSnapshot, ColorMode, CssVariableApplicator, Document, PaletteSource,
    PreviewColors, PreviewOverlay,
};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::ThemeConfig;
use crate::context::{ContextProvider, ResolutionContext};
use crate::resolver::{BrandSource, ThemeResolver};

/// Resolution, application and preview for one document
pub struct ThemeController<S: BrandSource, D: Document> {
    resolver: ThemeResolver<S>,
    applicator: Arc<CssVariableApplicator<D>>,
    preview: PreviewOverlay<D>,
    config: ThemeConfig,
    provider: Option<Arc<dyn ContextProvider>>,
    current: watch::Sender<Arc<BrandTheme>>,
}

impl<S: BrandSource, D: Document> ThemeController<S, D> {
    /// Create a controller
    ///
    /// Nothing is written to the document until a theme is resolved or
    /// applied.
    pub fn new(source: S, document: Arc<D>, config: ThemeConfig) -> Self {
        let resolver = ThemeResolver::new(source, &config);
        let applicator = Arc::new(CssVariableApplicator::with_mode(
            document,
            ColorMode::from_dark(config.dark_mode),
        ));
        let preview = PreviewOverlay::new(applicator.clone());
        let (current, _) = watch::channel(resolver.default_theme());

        Self {
            resolver,
            applicator,
            preview,
            config,
            provider: None,
            current,
        }
    }

    /// Read contexts from `provider` in [`resolve_current`](Self::resolve_current)
    pub fn with_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The resolver
    pub fn resolver(&self) -> &ThemeResolver<S> {
        &self.resolver
    }

    /// The applicator
    pub fn applicator(&self) -> &Arc<CssVariableApplicator<D>> {
        &self.applicator
    }

    /// The configuration
    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    /// The current resolved theme (the default theme until one resolves)
    pub fn current_theme(&self) -> Arc<BrandTheme> {
        self.current.borrow().clone()
    }

    /// Watch the current resolved theme
    pub fn subscribe(&self) -> watch::Receiver<Arc<BrandTheme>> {
        self.current.subscribe()
    }

    /// Whether a preview is open
    pub fn is_previewing(&self) -> bool {
        self.preview.is_active()
    }

    /// Whether the page is in dark mode
    pub fn is_dark_mode(&self) -> bool {
        self.applicator.mode().is_dark()
    }

    // ===== Resolution =====

    /// Resolve and apply the theme for `context`
    ///
    /// A result whose context was replaced while it was in flight is
    /// returned but not applied or published.
    pub async fn resolve(&self, context: &ResolutionContext) -> Arc<BrandTheme> {
        let resolution = self.resolver.resolve(context).await;
        if !resolution.is_current {
            tracing::debug!("Not applying brand theme for stale context {}", context);
            return resolution.theme;
        }
        self.publish_and_apply(resolution.theme.clone()).await;
        resolution.theme
    }

    /// Resolve the context read from the context provider
    ///
    /// Falls back to the default theme when no provider is set or it knows
    /// neither a tenant nor a host.
    pub async fn resolve_current(&self) -> Arc<BrandTheme> {
        let context = self
            .provider
            .as_deref()
            .and_then(|provider| ResolutionContext::from_provider(provider));

        match context {
            Some(context) => self.resolve(&context).await,
            None => {
                tracing::debug!("No tenant or host known, using default theme");
                self.apply_default_theme().await;
                self.resolver.default_theme()
            }
        }
    }

    /// Apply a theme directly, switching the color mode
    ///
    /// Returns `false` if a preview is open; the theme is still published and
    /// takes effect when the preview closes through a commit. A mode switch
    /// during a preview re-derives both the preview and its restore target.
    pub async fn apply_theme(&self, theme: &BrandTheme, is_dark: bool) -> bool {
        let theme = Arc::new(theme.clone());
        // Publish first so a mode switch re-derives from this theme
        self.current.send_replace(theme.clone());
        self.set_dark_mode(is_dark);
        self.apply_published(&theme).await
    }

    /// Apply the default theme in the current color mode
    pub async fn apply_default_theme(&self) -> bool {
        self.publish_and_apply(self.resolver.default_theme()).await
    }

    async fn publish_and_apply(&self, theme: Arc<BrandTheme>) -> bool {
        self.current.send_replace(theme.clone());
        self.apply_published(&theme).await
    }

    async fn apply_published(&self, theme: &BrandTheme) -> bool {
        let applied = self.applicator.apply(theme, self.applicator.mode()).await;
        if !applied {
            tracing::debug!("Preview open, resolved theme for {} held back", theme.tenant_name);
        }
        applied
    }

    // ===== Color mode =====

    /// Switch between light and dark mode, re-deriving whatever is applied
    pub fn set_dark_mode(&self, is_dark: bool) {
        let mode = ColorMode::from_dark(is_dark);
        if self.applicator.mode() == mode {
            return;
        }
        self.applicator.set_mode(mode);
        tracing::debug!("Color mode changed, dark = {}", is_dark);

        if self.preview.is_active() {
            // Restoring the old-mode palette on exit would be wrong too
            let restores_resolved = self
                .preview
                .restore_snapshot()
                .is_some_and(|s| s.source == Some(PaletteSource::Resolved));
            if restores_resolved {
                self.preview.rebase(AppliedPaletteSnapshot {
                    source: Some(PaletteSource::Resolved),
                    properties: css::derive_theme_properties(&self.current_theme(), mode),
                });
            }
            self.preview.reassert();
        } else if self.applicator.snapshot().source.is_some() {
            self.applicator.apply_colors(&self.current_theme(), mode);
        }
    }

    // ===== Preview =====

    /// Open a preview seeded from the current theme
    pub fn enter_preview(&self) -> AppliedPaletteSnapshot {
        self.preview.enter(&self.current_theme())
    }

    /// Show proposed colors; `false` if no preview is open
    pub fn update_preview(&self, colors: PreviewColors) -> bool {
        self.preview.update(colors)
    }

    /// Close the preview, restoring what was applied before it
    pub fn exit_preview(&self) -> bool {
        self.preview.exit()
    }

    /// Close the preview and make `saved` the resolved theme
    ///
    /// The saved theme primes the resolver cache for the current context, so
    /// the next resolution within TTL does not refetch (and cannot be
    /// overtaken by a fetch that started before the save).
    pub async fn commit_preview(&self, saved: BrandTheme) -> Arc<BrandTheme> {
        self.preview.exit();

        let theme = Arc::new(saved);
        if let Some(context) = self.resolver.current_context() {
            self.resolver.prime(context, theme.clone());
        }
        self.publish_and_apply(theme.clone()).await;
        tracing::info!("Committed brand theme for {}", theme.tenant_name);
        theme
    }

    // ===== Suggestions =====

    /// Secondary color suggestions for a primary color
    pub fn suggest_secondary_color(
        &self,
        primary: &str,
        opts: SuggestOptions,
    ) -> Vec<ColorSuggestion> {
        suggest_secondary_color(primary, opts)
    }
}
