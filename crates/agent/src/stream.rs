//! Content stream — the append-only validated output of a run.
//!
//! Consumers read the stream as ordered state rather than subscribing to a
//! channel; every item the loop attempted to emit is represented, in strict
//! iteration order. Pushing never fails: an invalid item is degraded to a
//! warning comment so the audit trail stays complete.

use tracing::warn;

use skein_core::content::ContentItem;

/// Append-only, schema-validating sink of content items.
#[derive(Debug, Default)]
pub struct ContentStream {
    items: Vec<ContentItem>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Invalid items become warning comments in place.
    pub fn push(&mut self, item: ContentItem) {
        match item.validate() {
            Ok(()) => self.items.push(item),
            Err(e) => {
                warn!(kind = item.kind(), error = %e, "Rejected malformed content item");
                self.items.push(ContentItem::sanitized(&e));
            }
        }
    }

    /// Ordered read-only view of everything emitted so far.
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The only removal path. Used by the session's `clear`/`clear_all`.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
