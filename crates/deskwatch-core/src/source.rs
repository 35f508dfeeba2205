//! The read-side boundary between the tracker and the ticketing service.

use crate::model::{Comment, ItemKind, TrackedItem};

/// Failure modes a [`Source`] implementation can surface.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request never completed (connect failure, DNS, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be decoded.
    #[error("{url} returned a malformed payload: {message}")]
    Payload { url: String, message: String },
}

/// Read operations the tracker needs from the ticketing service.
///
/// Implementations own transport, authentication, and paging. The tracker
/// assumes only that `TrackedItem::id` is stable across calls and that
/// comment dates from one thread are consistently comparable.
pub trait Source {
    /// Open incidents currently assigned to the authenticated operator.
    fn list_my_incidents(&self) -> Result<Vec<TrackedItem>, SourceError>;

    /// Changes currently assigned to the authenticated operator.
    fn list_my_changes(&self) -> Result<Vec<TrackedItem>, SourceError>;

    /// Full details for one item.
    fn fetch_details(&self, id: &str, kind: ItemKind) -> Result<TrackedItem, SourceError>;

    /// The complete comment thread for one item.
    fn fetch_comments(&self, id: &str, kind: ItemKind) -> Result<Vec<Comment>, SourceError>;

    /// Kind-dispatched wrapper over the two list calls.
    fn list_assigned(&self, kind: ItemKind) -> Result<Vec<TrackedItem>, SourceError> {
        match kind {
            ItemKind::Incident => self.list_my_incidents(),
            ItemKind::Change => self.list_my_changes(),
        }
    }
}
