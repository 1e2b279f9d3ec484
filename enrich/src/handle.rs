//! Rebuild-and-swap publishing for enrichers
//!
//! [`HeaderEnricher`] has no setters. Reconfiguring means building a new one
//! and swapping it in:
//!
//! ```text
//! caller A: load() ──► Arc<v1> ──► transform ...           (keeps v1)
//! admin:          swap(v2)
//! caller B:                 load() ──► Arc<v2> ──► transform
//! ```
//!
//! The lock is held only long enough to clone or replace the `Arc`, never
//! across a transform.

use crate::enricher::HeaderEnricher;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, swappable reference to the active enricher
#[derive(Debug, Clone)]
pub struct EnricherHandle {
    current: Arc<RwLock<Arc<HeaderEnricher>>>,
}

impl EnricherHandle {
    /// Publish an initial enricher
    pub fn new(enricher: HeaderEnricher) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(enricher))),
        }
    }

    /// Get the enricher currently in effect
    pub fn load(&self) -> Arc<HeaderEnricher> {
        self.current.read().clone()
    }

    /// Replace the active enricher, returning the previous one
    ///
    /// Transforms already running keep the enricher they loaded.
    pub fn swap(&self, enricher: HeaderEnricher) -> Arc<HeaderEnricher> {
        let next = Arc::new(enricher);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        tracing::info!(
            headers = previous.header_names().len(),
            "header enricher replaced"
        );
        previous
    }
}

impl From<HeaderEnricher> for EnricherHandle {
    fn from(enricher: HeaderEnricher) -> Self {
        Self::new(enricher)
    }
}
