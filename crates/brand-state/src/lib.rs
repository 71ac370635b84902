//! Theme state management
//!
//! This crate owns the runtime side of white-label theming: which context
//! (tenant or host) is current, the single TTL-cached resolution for it, and
//! the controller that pairs resolution with the document applicator and the
//! preview layer.
//!
//! # Modules
//!
//! - [`context`] - Resolution contexts and the provider they are read from
//! - [`config`] - TTL and default theme configuration
//! - [`resolver`] - Cached, coalesced theme resolution
//! - [`controller`] - The public theming facade

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod controller;
pub mod resolver;

pub use config::{ConfigError, ThemeConfig};
pub use context::{ContextProvider, ResolutionContext, StaticContext};
pub use controller::ThemeController;
pub use resolver::{
    BrandSource, CacheEntry, Resolution, ResolutionSource, ResolverState, ThemeResolver,
};
