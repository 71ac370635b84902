//! Theme resolution
//!
//! [`ThemeResolver`] resolves the brand theme for the current
//! [`ResolutionContext`] through a [`BrandSource`], keeping exactly one
//! cache entry for the current context:
//!
//! - A fresh entry for the same context is returned without a fetch.
//! - Switching context drops the entry eagerly; TTL only governs repeated
//!   resolutions of the same context.
//! - Concurrent resolutions of one context share a single fetch.
//! - A fetch that completes after its context stopped being current is
//!   reported with `is_current == false` and never touches the cache.
//! - Failures resolve to the default theme and leave the cache empty.

use async_trait::async_trait;
use brand_client::{BrandApiClient, BrandApiError, BrandTheme, TenantId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::ThemeConfig;
use crate::context::ResolutionContext;

// ===== Source =====

/// Where brand themes are looked up
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandSource: Send + Sync {
    /// Look up the theme of a tenant
    async fn by_tenant(&self, tenant_id: &TenantId) -> Result<BrandTheme, BrandApiError>;

    /// Look up the theme served on a host
    async fn by_host(&self, host: &str) -> Result<BrandTheme, BrandApiError>;
}

#[async_trait]
impl BrandSource for BrandApiClient {
    async fn by_tenant(&self, tenant_id: &TenantId) -> Result<BrandTheme, BrandApiError> {
        self.fetch_by_tenant(tenant_id).await
    }

    async fn by_host(&self, host: &str) -> Result<BrandTheme, BrandApiError> {
        self.fetch_by_host(host).await
    }
}

// ===== Types =====

/// Resolver lifecycle state for the current context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverState {
    /// Nothing resolved for the current context yet
    #[default]
    Idle,
    /// A fetch for the current context is in flight
    Resolving,
    /// The current context resolved successfully
    Resolved,
    /// The last fetch for the current context failed
    Failed,
}

/// A resolved theme and when it was resolved
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Context the theme was resolved for
    pub context: ResolutionContext,
    /// The theme
    pub theme: Arc<BrandTheme>,
    /// When the theme was stored
    pub resolved_at: Instant,
}

impl CacheEntry {
    /// Time since the entry was stored
    pub fn age(&self) -> Duration {
        self.resolved_at.elapsed()
    }

    /// Whether the entry is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Where a resolution's theme came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Fresh cache entry
    Cache,
    /// Network fetch (possibly shared with other callers)
    Network,
    /// Default theme after a failed fetch
    Fallback,
}

/// Outcome of [`ThemeResolver::resolve`]
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Context that was resolved
    pub context: ResolutionContext,
    /// Resolved theme, or the default theme on failure
    pub theme: Arc<BrandTheme>,
    /// Where the theme came from
    pub source: ResolutionSource,
    /// Whether the context was still current when the result arrived
    ///
    /// Callers must not apply a resolution that is no longer current.
    pub is_current: bool,
}

#[derive(Debug, Clone)]
enum FetchOutcome {
    Fetched(Arc<BrandTheme>),
    Failed,
}

#[derive(Debug, Clone)]
struct Settled {
    outcome: FetchOutcome,
    accepted: bool,
}

struct InFlight {
    id: u64,
    settled: watch::Receiver<Option<Settled>>,
}

#[derive(Default)]
struct ResolverInner {
    state: ResolverState,
    current: Option<ResolutionContext>,
    entry: Option<CacheEntry>,
    in_flight: HashMap<ResolutionContext, InFlight>,
    next_flight_id: u64,
}

impl ResolverInner {
    /// Make `context` current, dropping the cache entry if it changed
    fn switch_to(&mut self, context: &ResolutionContext) -> bool {
        if self.current.as_ref() == Some(context) {
            return false;
        }
        match &self.current {
            Some(previous) => tracing::info!("Brand context changed: {} -> {}", previous, context),
            None => tracing::info!("Brand context set: {}", context),
        }
        self.current = Some(context.clone());
        self.entry = None;
        self.state = if self.in_flight.contains_key(context) {
            ResolverState::Resolving
        } else {
            ResolverState::Idle
        };
        true
    }

    fn fresh_entry(&self, context: &ResolutionContext, ttl: Duration) -> Option<&CacheEntry> {
        self.entry
            .as_ref()
            .filter(|e| &e.context == context && e.is_fresh(ttl))
    }
}

/// Clears a flight's registration if its leader goes away early
struct FlightGuard<'a> {
    inner: &'a Mutex<ResolverInner>,
    context: &'a ResolutionContext,
    id: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.in_flight.get(self.context).is_some_and(|f| f.id == self.id) {
            inner.in_flight.remove(self.context);
        }
    }
}

// ===== Resolver =====

/// TTL-cached, coalescing theme resolver
pub struct ThemeResolver<S: BrandSource> {
    source: S,
    ttl: Duration,
    default_theme: Arc<BrandTheme>,
    inner: Mutex<ResolverInner>,
}

impl<S: BrandSource> ThemeResolver<S> {
    /// Create a resolver
    pub fn new(source: S, config: &ThemeConfig) -> Self {
        Self {
            source,
            ttl: config.ttl,
            default_theme: Arc::new(config.default_theme()),
            inner: Mutex::new(ResolverInner::default()),
        }
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cache TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Theme used when resolution fails
    pub fn default_theme(&self) -> Arc<BrandTheme> {
        self.default_theme.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ResolverState {
        self.inner.lock().state
    }

    /// Current context
    pub fn current_context(&self) -> Option<ResolutionContext> {
        self.inner.lock().current.clone()
    }

    /// Whether `context` is the current context
    pub fn is_current(&self, context: &ResolutionContext) -> bool {
        self.inner.lock().current.as_ref() == Some(context)
    }

    /// The cache entry, if it is still fresh
    pub fn cached(&self) -> Option<CacheEntry> {
        let inner = self.inner.lock();
        inner
            .entry
            .as_ref()
            .filter(|e| e.is_fresh(self.ttl))
            .cloned()
    }

    /// Drop the cache entry so the next resolution fetches
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        if inner.entry.take().is_some() {
            tracing::debug!("Brand cache invalidated");
        }
    }

    /// Make `context` current without resolving it
    ///
    /// Returns `true` if the context changed. A change drops the cache entry
    /// and makes any fetch for the previous context stale.
    pub fn set_context(&self, context: ResolutionContext) -> bool {
        self.inner.lock().switch_to(&context)
    }

    /// Store `theme` as freshly resolved for `context`, making it current
    ///
    /// A fetch for the same context that is still in flight is superseded:
    /// when it lands it neither replaces this entry nor reports as current.
    pub fn prime(&self, context: ResolutionContext, theme: Arc<BrandTheme>) {
        let mut inner = self.inner.lock();
        inner.switch_to(&context);
        inner.in_flight.remove(&context);
        inner.entry = Some(CacheEntry {
            context,
            theme,
            resolved_at: Instant::now(),
        });
        inner.state = ResolverState::Resolved;
    }

    /// Resolve the theme for `context`, making it current
    ///
    /// Never fails: a failed lookup yields the default theme with
    /// [`ResolutionSource::Fallback`].
    pub async fn resolve(&self, context: &ResolutionContext) -> Resolution {
        loop {
            let pending = {
                let mut inner = self.inner.lock();
                inner.switch_to(context);

                if let Some(entry) = inner.fresh_entry(context, self.ttl) {
                    tracing::debug!("Brand cache hit for {}", context);
                    return Resolution {
                        context: context.clone(),
                        theme: entry.theme.clone(),
                        source: ResolutionSource::Cache,
                        is_current: true,
                    };
                }

                inner.in_flight.get(context).map(|f| f.settled.clone())
            };

            let Some(mut settled) = pending else {
                return self.lead(context).await;
            };

            tracing::debug!("Joining in-flight brand resolution for {}", context);
            let result = settled
                .wait_for(Option::is_some)
                .await
                .map(|value| value.clone());

            match result {
                Ok(Some(settled)) => {
                    let is_current = settled.accepted && self.is_current(context);
                    return self.finish(context, settled.outcome, is_current);
                }
                // Leader went away before finishing; try again
                _ => continue,
            }
        }
    }

    async fn lead(&self, context: &ResolutionContext) -> Resolution {
        let (tx, rx) = watch::channel(None);
        let flight_id = {
            let mut inner = self.inner.lock();
            inner.next_flight_id += 1;
            let flight_id = inner.next_flight_id;
            inner.in_flight.insert(
                context.clone(),
                InFlight {
                    id: flight_id,
                    settled: rx,
                },
            );
            if inner.current.as_ref() == Some(context) {
                inner.state = ResolverState::Resolving;
            }
            flight_id
        };
        // Dropped before `tx`, so followers never find a closed channel
        // still registered
        let _guard = FlightGuard {
            inner: &self.inner,
            context,
            id: flight_id,
        };

        tracing::debug!("Fetching brand theme for {}", context);
        let result = match context {
            ResolutionContext::Tenant(tenant_id) => self.source.by_tenant(tenant_id).await,
            ResolutionContext::Host { host, .. } => self.source.by_host(host).await,
        };

        let outcome = match result {
            Ok(theme) => FetchOutcome::Fetched(Arc::new(theme)),
            Err(e) => {
                tracing::warn!(
                    "Brand resolution failed for {}, using default theme: {}",
                    context,
                    e
                );
                FetchOutcome::Failed
            }
        };

        let accepted = {
            let mut inner = self.inner.lock();
            let owns_flight = inner
                .in_flight
                .get(context)
                .is_some_and(|f| f.id == flight_id);
            if owns_flight {
                inner.in_flight.remove(context);
            }

            let accepted = owns_flight && inner.current.as_ref() == Some(context);
            if accepted {
                match &outcome {
                    FetchOutcome::Fetched(theme) => {
                        inner.entry = Some(CacheEntry {
                            context: context.clone(),
                            theme: theme.clone(),
                            resolved_at: Instant::now(),
                        });
                        inner.state = ResolverState::Resolved;
                        tracing::info!("Resolved brand theme for {}", context);
                    }
                    FetchOutcome::Failed => {
                        inner.entry = None;
                        inner.state = ResolverState::Failed;
                    }
                }
            } else {
                tracing::debug!("Discarding stale brand resolution for {}", context);
            }
            accepted
        };

        tx.send_replace(Some(Settled {
            outcome: outcome.clone(),
            accepted,
        }));
        self.finish(context, outcome, accepted)
    }

    fn finish(
        &self,
        context: &ResolutionContext,
        outcome: FetchOutcome,
        is_current: bool,
    ) -> Resolution {
        let (theme, source) = match outcome {
            FetchOutcome::Fetched(theme) => (theme, ResolutionSource::Network),
            FetchOutcome::Failed => (self.default_theme.clone(), ResolutionSource::Fallback),
        };
        Resolution {
            context: context.clone(),
            theme,
            source,
            is_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_color::HexColor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn acme() -> BrandTheme {
        BrandTheme::new("Acme")
            .with_tenant_id("t_acme")
            .with_primary(HexColor::parse("#14b8a6").unwrap())
    }

    fn offline() -> BrandApiError {
        BrandApiError::new(0, "NetworkError", "connection refused")
    }

    /// Source that takes a while to answer and counts lookups
    struct SlowSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl SlowSource {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BrandSource for SlowSource {
        async fn by_tenant(&self, tenant_id: &TenantId) -> Result<BrandTheme, BrandApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(BrandTheme::new(tenant_id.as_str()).with_tenant_id(tenant_id.clone()))
        }

        async fn by_host(&self, host: &str) -> Result<BrandTheme, BrandApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(BrandTheme::new(host))
        }
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let mut source = MockBrandSource::new();
        source
            .expect_by_tenant()
            .withf(|id: &TenantId| id.as_str() == "t_acme")
            .times(1)
            .returning(|_| Ok(acme()));

        let resolver = ThemeResolver::new(source, &ThemeConfig::default());
        let ctx = ResolutionContext::tenant("t_acme");

        let first = resolver.resolve(&ctx).await;
        let second = resolver.resolve(&ctx).await;

        assert_eq!(first.source, ResolutionSource::Network);
        assert_eq!(second.source, ResolutionSource::Cache);
        assert!(Arc::ptr_eq(&first.theme, &second.theme));
        assert_eq!(resolver.state(), ResolverState::Resolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_after_ttl() {
        let mut source = MockBrandSource::new();
        source.expect_by_tenant().times(2).returning(|_| Ok(acme()));

        let config = ThemeConfig::default();
        let resolver = ThemeResolver::new(source, &config);
        let ctx = ResolutionContext::tenant("t_acme");

        resolver.resolve(&ctx).await;
        tokio::time::advance(config.ttl - Duration::from_secs(1)).await;
        assert_eq!(resolver.resolve(&ctx).await.source, ResolutionSource::Cache);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(resolver.cached().is_none());
        assert_eq!(resolver.resolve(&ctx).await.source, ResolutionSource::Network);
    }

    #[tokio::test]
    async fn test_context_switch_does_not_reuse_cache() {
        let mut source = MockBrandSource::new();
        source
            .expect_by_tenant()
            .withf(|id: &TenantId| id.as_str() == "t_a")
            .times(1)
            .returning(|_| Ok(BrandTheme::new("A")));
        source
            .expect_by_tenant()
            .withf(|id: &TenantId| id.as_str() == "t_b")
            .times(1)
            .returning(|_| Ok(BrandTheme::new("B")));

        let resolver = ThemeResolver::new(source, &ThemeConfig::default());

        let a = resolver.resolve(&ResolutionContext::tenant("t_a")).await;
        let b = resolver.resolve(&ResolutionContext::tenant("t_b")).await;

        assert_eq!(a.theme.tenant_name, "A");
        assert_eq!(b.theme.tenant_name, "B");
        assert_eq!(b.source, ResolutionSource::Network);
        assert_eq!(resolver.cached().unwrap().context, ResolutionContext::tenant("t_b"));
    }

    #[tokio::test]
    async fn test_host_path_change_re_resolves_by_host() {
        let mut source = MockBrandSource::new();
        source
            .expect_by_host()
            .withf(|host: &str| host == "portal.acme.com")
            .times(2)
            .returning(|_| Ok(acme()));

        let resolver = ThemeResolver::new(source, &ThemeConfig::default());
        resolver
            .resolve(&ResolutionContext::host_with_path("portal.acme.com", "/"))
            .await;
        let moved = resolver
            .resolve(&ResolutionContext::host_with_path("portal.acme.com", "/book"))
            .await;

        assert_eq!(moved.source, ResolutionSource::Network);
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_leaves_cache_empty() {
        let mut source = MockBrandSource::new();
        source.expect_by_tenant().times(2).returning(|_| Err(offline()));

        let resolver = ThemeResolver::new(source, &ThemeConfig::default());
        let ctx = ResolutionContext::tenant("t_acme");

        let resolution = resolver.resolve(&ctx).await;
        assert_eq!(resolution.source, ResolutionSource::Fallback);
        assert!(resolution.is_current);
        assert_eq!(resolution.theme.primary_color.unwrap().to_string(), "#2563eb");
        assert_eq!(resolver.state(), ResolverState::Failed);
        assert!(resolver.cached().is_none());

        // The failure is not cached
        assert_eq!(resolver.resolve(&ctx).await.source, ResolutionSource::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_resolutions_share_one_fetch() {
        let resolver = ThemeResolver::new(
            SlowSource::new(Duration::from_millis(200)),
            &ThemeConfig::default(),
        );
        let ctx = ResolutionContext::tenant("t_acme");

        let (a, b, c) = tokio::join!(
            resolver.resolve(&ctx),
            resolver.resolve(&ctx),
            resolver.resolve(&ctx)
        );

        assert_eq!(resolver.source().calls(), 1);
        assert!(Arc::ptr_eq(&a.theme, &b.theme));
        assert!(Arc::ptr_eq(&a.theme, &c.theme));
        assert!(a.is_current && b.is_current && c.is_current);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_is_resolving_while_in_flight() {
        let resolver = ThemeResolver::new(
            SlowSource::new(Duration::from_millis(200)),
            &ThemeConfig::default(),
        );
        let ctx = ResolutionContext::tenant("t_acme");

        let (resolution, observed) = tokio::join!(resolver.resolve(&ctx), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            resolver.state()
        });

        assert_eq!(observed, ResolverState::Resolving);
        assert_eq!(resolution.source, ResolutionSource::Network);
        assert_eq!(resolver.state(), ResolverState::Resolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_arrival_is_discarded() {
        let resolver = ThemeResolver::new(
            SlowSource::new(Duration::from_millis(200)),
            &ThemeConfig::default(),
        );
        let a = ResolutionContext::tenant("t_a");
        let b = ResolutionContext::tenant("t_b");

        let (late, _) = tokio::join!(resolver.resolve(&a), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(resolver.set_context(b.clone()));
        });

        assert!(!late.is_current);
        assert_eq!(late.theme.tenant_name, "t_a");
        assert!(resolver.cached().is_none());
        assert_eq!(resolver.current_context(), Some(b));
        assert_eq!(resolver.state(), ResolverState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prime_supersedes_in_flight_fetch() {
        let resolver = ThemeResolver::new(
            SlowSource::new(Duration::from_millis(200)),
            &ThemeConfig::default(),
        );
        let ctx = ResolutionContext::tenant("t_acme");
        let saved = Arc::new(BrandTheme::new("Saved"));

        let (fetched, _) = tokio::join!(resolver.resolve(&ctx), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            resolver.prime(ctx.clone(), saved.clone());
        });

        assert!(!fetched.is_current);
        let entry = resolver.cached().unwrap();
        assert!(Arc::ptr_eq(&entry.theme, &saved));
        assert_eq!(resolver.resolve(&ctx).await.source, ResolutionSource::Cache);
        assert_eq!(resolver.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mut source = MockBrandSource::new();
        source.expect_by_tenant().times(2).returning(|_| Ok(acme()));

        let resolver = ThemeResolver::new(source, &ThemeConfig::default());
        let ctx = ResolutionContext::tenant("t_acme");

        resolver.resolve(&ctx).await;
        resolver.invalidate();
        assert!(resolver.cached().is_none());
        assert_eq!(resolver.resolve(&ctx).await.source, ResolutionSource::Network);
    }

    #[test]
    fn test_set_context_reports_changes() {
        let resolver = ThemeResolver::new(MockBrandSource::new(), &ThemeConfig::default());
        assert_eq!(resolver.state(), ResolverState::Idle);
        assert!(resolver.set_context(ResolutionContext::tenant("t_a")));
        assert!(!resolver.set_context(ResolutionContext::tenant("t_a")));
        assert!(resolver.is_current(&ResolutionContext::tenant("t_a")));
    }
}
