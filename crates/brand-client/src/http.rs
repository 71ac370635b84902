//! HTTP client for the brand persistence API
//!
//! Two read-only lookups are exposed:
//!
//! - `GET {base_url}/api/brand/tenants/{tenant_id}`
//! - `GET {base_url}/api/brand/hosts/{host}`
//!
//! Both return a [`BrandTheme`] JSON body. Non-2xx responses are mapped to
//! [`BrandApiError`] carrying the HTTP status; transport failures use status 0.

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

use crate::model::{BrandTheme, TenantId};

// =============================================================================
// Error Types
// =============================================================================

/// Brand API error with HTTP status and message
///
/// # Examples
/// ```
/// use brand_client::BrandApiError;
///
/// let error = BrandApiError::new(404, "NotFound", "No brand for host");
/// assert!(error.is_not_found());
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Brand API error {status}: {code} - {message}")]
pub struct BrandApiError {
    status: u16,
    code: String,
    message: String,
}

impl BrandApiError {
    /// Create a new error
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// HTTP status code (0 for transport failures)
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Error code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this looks like a transient network failure
    ///
    /// Retryable statuses: 0/1 (transport), 408, 425, 429, 500, 502, 503, 504, 522, 524
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.status,
            0 | 1 | 408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524
        )
    }

    /// Whether retrying could help
    pub fn is_recoverable(&self) -> bool {
        self.is_network_error()
    }

    /// Whether the lookup found no brand record
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error code
    pub error: String,
    /// Error message
    pub message: String,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`BrandApiClient`]
#[derive(Debug, Clone)]
pub struct BrandApiConfig {
    /// Base URL of the portal API (e.g., "https://portal.example.com")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// Retries for network-class failures (0 disables retrying)
    pub max_retries: u32,
    /// Wait before the first retry; doubles on each further attempt
    pub retry_delay: Duration,
    /// Ceiling for the wait between retries
    pub retry_max_delay: Duration,
}

impl Default for BrandApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Brand-Portal/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
            max_retries: 0,
            retry_delay: Duration::from_millis(100),
            retry_max_delay: Duration::from_secs(5),
        }
    }
}

impl BrandApiConfig {
    /// Create a config for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the retry budget for network-class failures
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first retry wait and its ceiling
    pub fn with_retry_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_delay = initial;
        self.retry_max_delay = max;
        self
    }

    /// Wait before retry number `attempt` (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor).min(self.retry_max_delay)
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for brand lookups
#[derive(Debug, Clone)]
pub struct BrandApiClient {
    client: ReqwestClient,
    config: BrandApiConfig,
}

impl BrandApiClient {
    /// Create a new client
    pub fn new(config: BrandApiConfig) -> Result<Self, BrandApiError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| BrandApiError::new(0, "ClientBuild", e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Look up the brand of an authenticated tenant
    pub async fn fetch_by_tenant(&self, tenant_id: &TenantId) -> Result<BrandTheme, BrandApiError> {
        let url = format!(
            "{}/api/brand/tenants/{}",
            self.base_url(),
            urlencoding::encode(tenant_id.as_str())
        );
        self.get_with_retry(&url).await
    }

    /// Look up the brand serving a host (custom domain or subdomain)
    pub async fn fetch_by_host(&self, host: &str) -> Result<BrandTheme, BrandApiError> {
        let url = format!(
            "{}/api/brand/hosts/{}",
            self.base_url(),
            urlencoding::encode(&host.to_ascii_lowercase())
        );
        self.get_with_retry(&url).await
    }

    async fn get_with_retry(&self, url: &str) -> Result<BrandTheme, BrandApiError> {
        let mut attempt = 0;
        loop {
            match self.get(url).await {
                Err(err) if err.is_recoverable() && attempt < self.config.max_retries => {
                    let wait = self.config.backoff(attempt);
                    tracing::debug!("Brand lookup failed ({}), retrying in {:?}", err, wait);
                    sleep(wait).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn get(&self, url: &str) -> Result<BrandTheme, BrandApiError> {
        let mut req = self.client.get(url).header("Accept", "application/json");
        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        tracing::debug!("GET {}", url);
        let response = req
            .send()
            .await
            .map_err(|e| BrandApiError::new(0, "NetworkError", format!("Request failed: {}", e)))?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: ReqwestResponse) -> Result<BrandTheme, BrandApiError> {
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => BrandApiError::new(status, err.error, err.message),
                Err(_) => {
                    BrandApiError::new(status, "Unknown", format!("HTTP {}: {}", status, body))
                }
            });
        }

        let body = response.text().await.map_err(|e| {
            BrandApiError::new(0, "ParseError", format!("Failed to read response: {}", e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            BrandApiError::new(0, "ParseError", format!("Failed to parse JSON: {}", e))
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &BrandApiConfig {
        &self.config
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}
