//! Document seam
//!
//! The theme engine never touches browser globals directly. It writes through
//! two small traits: [`StyleSink`] for custom properties on the root element
//! (plus the body font mirror) and [`FaviconSlot`] for the `<link rel="icon">`
//! in the head. [`MemoryDocument`] implements both in memory and is what the
//! engine runs against headless and in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Priority flag for a custom property write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Regular declaration
    #[default]
    Normal,
    /// `!important` declaration
    Important,
}

/// Root element style access
pub trait StyleSink: Send + Sync {
    /// Set a custom property on the root element
    fn set_property(&self, name: &str, value: &str, priority: Priority);

    /// Remove a custom property from the root element
    fn remove_property(&self, name: &str);

    /// Set or clear the body's inline `font-family`
    fn set_body_font(&self, family: Option<&str>);
}

/// Favicon link in the document head
#[async_trait]
pub trait FaviconSlot: Send + Sync {
    /// Replace any existing icon link with one pointing at `href`
    fn replace_icon(&self, href: &str);

    /// Remove the icon link, leaving the browser default
    fn remove_icon(&self);

    /// Current icon link target, if any
    fn current_icon(&self) -> Option<String>;

    /// Try to load `href` as an image; `false` when it fails to load
    async fn probe(&self, href: &str) -> bool;
}

/// Everything the applicator needs from a document
pub trait Document: StyleSink + FaviconSlot {}

impl<T: StyleSink + FaviconSlot> Document for T {}

#[derive(Debug, Default)]
struct MemoryDocumentInner {
    properties: BTreeMap<String, (String, Priority)>,
    body_font: Option<String>,
    icon: Option<String>,
    unreachable: HashSet<String>,
    write_count: usize,
}

/// In-memory document
///
/// Icons load successfully unless marked with [`MemoryDocument::mark_unreachable`].
#[derive(Debug, Default)]
pub struct MemoryDocument {
    inner: Mutex<MemoryDocumentInner>,
    probe_delay: Option<Duration>,
}

impl MemoryDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Make icon probes take `delay` before reporting
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = Some(delay);
        self
    }

    /// Make probes of `href` fail
    pub fn mark_unreachable(&self, href: impl Into<String>) {
        self.inner.lock().unreachable.insert(href.into());
    }

    /// Value of a custom property
    pub fn property(&self, name: &str) -> Option<String> {
        self.inner.lock().properties.get(name).map(|(v, _)| v.clone())
    }

    /// Priority of a custom property
    pub fn priority(&self, name: &str) -> Option<Priority> {
        self.inner.lock().properties.get(name).map(|(_, p)| *p)
    }

    /// All custom properties and their values
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.inner
            .lock()
            .properties
            .iter()
            .map(|(k, (v, _))| (k.clone(), v.clone()))
            .collect()
    }

    /// Inline body font
    pub fn body_font(&self) -> Option<String> {
        self.inner.lock().body_font.clone()
    }

    /// Number of property writes and removals seen so far
    pub fn write_count(&self) -> usize {
        self.inner.lock().write_count
    }
}

impl StyleSink for MemoryDocument {
    fn set_property(&self, name: &str, value: &str, priority: Priority) {
        let mut inner = self.inner.lock();
        inner.write_count += 1;
        inner
            .properties
            .insert(name.to_string(), (value.to_string(), priority));
    }

    fn remove_property(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.write_count += 1;
        inner.properties.remove(name);
    }

    fn set_body_font(&self, family: Option<&str>) {
        self.inner.lock().body_font = family.map(str::to_string);
    }
}

#[async_trait]
impl FaviconSlot for MemoryDocument {
    fn replace_icon(&self, href: &str) {
        self.inner.lock().icon = Some(href.to_string());
    }

    fn remove_icon(&self) {
        self.inner.lock().icon = None;
    }

    fn current_icon(&self) -> Option<String> {
        self.inner.lock().icon.clone()
    }

    async fn probe(&self, href: &str) -> bool {
        if let Some(delay) = self.probe_delay {
            tokio::time::sleep(delay).await;
        }
        !self.inner.lock().unreachable.contains(href)
    }
}
