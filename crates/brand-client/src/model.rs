//! Brand theme record
//!
//! The JSON shape returned by the brand persistence API. Field names are
//! camelCase on the wire. Stored records are not trusted: a color field that
//! is not a strict `#RRGGBB` value is dropped (treated as absent) instead of
//! failing the whole record.

use brand_color::HexColor;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque tenant identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

fn lenient_color<'de, D>(deserializer: D) -> Result<Option<HexColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => match HexColor::parse(&s) {
            Ok(color) => Some(color),
            Err(e) => {
                tracing::warn!("Dropping stored brand color: {}", e);
                None
            }
        },
        Some(other) => {
            tracing::warn!("Dropping non-string brand color: {}", other);
            None
        }
    })
}

/// The resolved visual identity of one tenant
///
/// Replaced wholesale on every resolution; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandTheme {
    /// Tenant this theme belongs to (absent for host-based lookups that
    /// do not disclose it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    /// Primary brand color
    #[serde(default, deserialize_with = "lenient_color", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<HexColor>,

    /// Secondary brand color
    #[serde(default, deserialize_with = "lenient_color", skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<HexColor>,

    /// Logo image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Favicon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,

    /// Whether the tenant asked to hide the "powered by" badge
    #[serde(default)]
    pub hide_powered_by: bool,

    /// Whether the tenant's plan allows hiding the badge
    #[serde(default)]
    pub can_hide_powered_by: bool,

    /// Plan tier, only used as a gating input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,

    /// Display name
    #[serde(default)]
    pub tenant_name: String,

    /// Brand font family from the extended payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl BrandTheme {
    /// Create a theme with just a display name
    pub fn new(tenant_name: impl Into<String>) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            ..Default::default()
        }
    }

    /// Set the tenant id
    pub fn with_tenant_id(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the primary color
    pub fn with_primary(mut self, color: HexColor) -> Self {
        self.primary_color = Some(color);
        self
    }

    /// Set the secondary color
    pub fn with_secondary(mut self, color: HexColor) -> Self {
        self.secondary_color = Some(color);
        self
    }

    /// Set the favicon URL
    pub fn with_favicon(mut self, url: impl Into<String>) -> Self {
        self.favicon_url = Some(url.into());
        self
    }

    /// Set the logo URL
    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    /// Set the brand font family
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Whether the "powered by" badge should be rendered
    ///
    /// Hiding requires both the tenant's intent and the plan entitlement.
    pub fn shows_powered_by(&self) -> bool {
        !(self.hide_powered_by && self.can_hide_powered_by)
    }
}
