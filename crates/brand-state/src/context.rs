//! Resolution context
//!
//! A context is the key a brand theme is looked up by. Authenticated visitors
//! resolve by tenant id; anonymous visitors on a white-label domain resolve by
//! host. A tenant id, when known, always wins over the host.

use brand_client::TenantId;
use parking_lot::RwLock;
use std::fmt;

/// Key for one brand resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionContext {
    /// Authenticated visitor of a known tenant
    Tenant(TenantId),
    /// Anonymous visitor on a host
    ///
    /// The path takes part in context identity (navigating to another path
    /// re-resolves) but the lookup itself only uses the host.
    Host {
        /// Lowercased host name
        host: String,
        /// Current path
        path: String,
    },
}

impl ResolutionContext {
    /// Tenant context
    pub fn tenant(tenant_id: impl Into<TenantId>) -> Self {
        ResolutionContext::Tenant(tenant_id.into())
    }

    /// Host context at the root path
    pub fn host(host: impl AsRef<str>) -> Self {
        Self::host_with_path(host, "/")
    }

    /// Host context at a specific path
    pub fn host_with_path(host: impl AsRef<str>, path: impl Into<String>) -> Self {
        let path = path.into();
        ResolutionContext::Host {
            host: host.as_ref().trim().to_ascii_lowercase(),
            path: if path.is_empty() { "/".to_string() } else { path },
        }
    }

    /// Pick a context from whatever is known, tenant first
    ///
    /// Blank values count as absent. Returns `None` when neither is usable.
    pub fn from_parts(
        tenant_id: Option<&str>,
        host: Option<&str>,
        path: Option<&str>,
    ) -> Option<Self> {
        if let Some(id) = tenant_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Some(Self::tenant(id));
        }
        host.map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| Self::host_with_path(h, path.unwrap_or("/")))
    }

    /// Read the current context from a provider
    pub fn from_provider(provider: &dyn ContextProvider) -> Option<Self> {
        let tenant_id = provider.tenant_id();
        let host = provider.host();
        let path = provider.path();
        Self::from_parts(
            tenant_id.as_ref().map(TenantId::as_str),
            host.as_deref(),
            path.as_deref(),
        )
    }

    /// Whether this is a tenant context
    pub fn is_tenant(&self) -> bool {
        matches!(self, ResolutionContext::Tenant(_))
    }
}

impl fmt::Display for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionContext::Tenant(id) => write!(f, "tenant:{}", id),
            ResolutionContext::Host { host, path } => write!(f, "host:{}{}", host, path),
        }
    }
}

/// Source of the current tenant and host
///
/// Read-only from the theme engine's point of view; the session layer owns
/// these values.
pub trait ContextProvider: Send + Sync {
    /// Tenant id of the signed-in visitor, if any
    fn tenant_id(&self) -> Option<TenantId>;

    /// Host of the current request
    fn host(&self) -> Option<String>;

    /// Path of the current request
    fn path(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Default, Clone)]
struct StaticContextValues {
    tenant_id: Option<TenantId>,
    host: Option<String>,
    path: Option<String>,
}

/// Settable in-process context provider
#[derive(Debug, Default)]
pub struct StaticContext {
    values: RwLock<StaticContextValues>,
}

impl StaticContext {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider for a host
    pub fn for_host(host: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.set_host(Some(host.into()));
        ctx
    }

    /// Provider for a tenant
    pub fn for_tenant(tenant_id: impl Into<TenantId>) -> Self {
        let ctx = Self::new();
        ctx.set_tenant(Some(tenant_id.into()));
        ctx
    }

    /// Set or clear the signed-in tenant
    pub fn set_tenant(&self, tenant_id: Option<TenantId>) {
        self.values.write().tenant_id = tenant_id;
    }

    /// Set or clear the host
    pub fn set_host(&self, host: Option<String>) {
        self.values.write().host = host;
    }

    /// Set or clear the path
    pub fn set_path(&self, path: Option<String>) {
        self.values.write().path = path;
    }
}

impl ContextProvider for StaticContext {
    fn tenant_id(&self) -> Option<TenantId> {
        self.values.read().tenant_id.clone()
    }

    fn host(&self) -> Option<String> {
        self.values.read().host.clone()
    }

    fn path(&self) -> Option<String> {
        self.values.read().path.clone()
    }
}
