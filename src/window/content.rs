//! Contracts of the external collaborators that render document content.
//!
//! The pane core never renders anything itself. It asks a [`ContentSource`]
//! for rendered content and hands the result to the pane's view through
//! [`DocumentViews`].

use lectern_core::{DocumentId, Division, Location, WindowId};
use thiserror::Error;

/// Rendered content ready to be shown in a pane.
#[derive(Clone, Debug, PartialEq)]
pub struct Content {
    pub document: DocumentId,
    pub location: Location,
    pub body: String,
    /// True for the locally rendered placeholder shown when fetching failed.
    pub is_error: bool,
}

impl Content {
    pub fn new(document: DocumentId, location: Location, body: impl Into<String>) -> Self {
        Self {
            document,
            location,
            body: body.into(),
            is_error: false,
        }
    }

    pub fn error_placeholder(document: DocumentId, location: Location, error: &FetchError) -> Self {
        let body = match error {
            FetchError::OutOfMemory { .. } => {
                "Not enough memory to show this page. Try a smaller section.".to_string()
            }
            FetchError::Unavailable { reason, .. } => format!("This page could not be shown: {}", reason),
        };
        Self {
            document,
            location,
            body,
            is_error: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("out of memory rendering {document}")]
    OutOfMemory { document: DocumentId },
    #[error("{document} unavailable: {reason}")]
    Unavailable { document: DocumentId, reason: String },
}

/// Produces rendered content for a document location. Called off the
/// interactive thread; may be slow.
pub trait ContentSource: Send + Sync {
    fn fetch(&self, document: &DocumentId, location: &Location) -> Result<Content, FetchError>;
}

/// Live content views, one per pane, owned by the UI.
pub trait DocumentViews: Send + Sync {
    /// The pane's view exists and can receive content.
    fn is_attached(&self, window: WindowId) -> bool;

    /// The pane's view has shown content at least once.
    fn is_initialized(&self, window: WindowId) -> bool;

    /// The pane's view already holds the whole division, so moving inside it is a scroll.
    fn has_page_loaded(&self, window: WindowId, division: &Division) -> bool;

    fn show(&self, window: WindowId, content: Content, notify_location_change: bool);

    /// Release the pane's view. Called when the pane is closed or the workspace unloaded.
    fn destroy(&self, window: WindowId);
}
