//! Sinks receiving the canonical share query string.

use std::sync::Arc;

use parking_lot::RwLock;

/// Receiver of the shareable query string whenever the criteria change.
pub trait UrlSink: Send {
    /// Replace the current location's query with `query` (no leading `?`).
    fn replace(&mut self, query: &str);
}

impl<F> UrlSink for F
where
    F: FnMut(&str) + Send,
{
    fn replace(&mut self, query: &str) {
        self(query)
    }
}

/// Thread-safe holder of the latest share query, readable by a renderer.
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    inner: Arc<RwLock<String>>,
}

impl SharedLocation {
    /// Create an empty location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest published query string.
    pub fn query(&self) -> String {
        self.inner.read().clone()
    }

    /// Full link for the given base, e.g. `gamesearch://search?q=halo`.
    pub fn link(&self, base: &str) -> String {
        let query = self.query();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }
}

impl UrlSink for SharedLocation {
    fn replace(&mut self, query: &str) {
        *self.inner.write() = query.to_string();
    }
}
