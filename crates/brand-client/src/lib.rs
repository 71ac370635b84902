//! Brand persistence API client
//!
//! This crate provides the `BrandTheme` record as it travels over the wire and
//! an HTTP client for the two lookups the theme engine needs: by tenant id
//! (authenticated visitors) and by host (anonymous, white-label domains).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod http;
pub mod model;

pub use http::{BrandApiClient, BrandApiConfig, BrandApiError};
pub use model::{BrandTheme, TenantId};

/// Result type for brand API operations
pub type Result<T> = std::result::Result<T, BrandApiError>;
