//! Theme engine configuration

use brand_client::BrandTheme;
use brand_color::HexColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read theme config: {0}")]
    Io(#[from] std::io::Error),

    /// Config contents are not valid
    #[error("Invalid theme config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Theme engine configuration
///
/// Every field has a default, so a config file only needs the values it
/// overrides:
///
/// ```
/// use brand_state::ThemeConfig;
/// use std::time::Duration;
///
/// let config = ThemeConfig::from_json_str(r#"{ "ttl_secs": 60 }"#).unwrap();
/// assert_eq!(config.ttl, Duration::from_secs(60));
/// assert_eq!(config.default_primary.to_string(), "#2563eb");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// How long a resolved theme stays fresh
    #[serde(rename = "ttl_secs", with = "duration_secs")]
    pub ttl: Duration,

    /// Primary color of the default theme
    pub default_primary: HexColor,

    /// Secondary color of the default theme
    pub default_secondary: HexColor,

    /// Display name of the default theme
    pub default_tenant_name: String,

    /// Start in dark mode
    pub dark_mode: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            default_primary: HexColor::from_rgb(0x25, 0x63, 0xeb),
            default_secondary: HexColor::from_rgb(0x6b, 0x72, 0x80),
            default_tenant_name: "Portal".to_string(),
            dark_mode: false,
        }
    }
}

impl ThemeConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the default theme colors
    pub fn with_default_colors(mut self, primary: HexColor, secondary: HexColor) -> Self {
        self.default_primary = primary;
        self.default_secondary = secondary;
        self
    }

    /// Start in dark mode
    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    /// Parse a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!("Loaded theme config from {}", path.as_ref().display());
        Ok(config)
    }

    /// The process-wide default theme
    pub fn default_theme(&self) -> BrandTheme {
        BrandTheme::new(self.default_tenant_name.clone())
            .with_primary(self.default_primary)
            .with_secondary(self.default_secondary)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
