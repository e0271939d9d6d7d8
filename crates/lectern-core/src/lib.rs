//! Identifiers and document/location value types shared by the lectern crates.

pub mod id;
pub mod types;

pub use id::{WindowId, WorkspaceId};
pub use types::{DocumentCategory, DocumentId, Division, Location, VerseRef};
