//! Per-pane content cursor.
//!
//! Each pane remembers the current document of every category it has shown,
//! one verse shared by Bibles and commentaries, and a key for every other
//! category. Switching category keeps the other cursors intact.

use lectern_core::{DocumentCategory, DocumentId, Location, VerseRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document and location a pane shows (or should show).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageSnapshot {
    pub category: DocumentCategory,
    pub document: DocumentId,
    pub location: Location,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageManager {
    #[serde(default)]
    current_category: DocumentCategory,
    #[serde(default)]
    documents: BTreeMap<DocumentCategory, DocumentId>,
    /// Shared by Bible and Commentary.
    #[serde(default)]
    verse: Option<VerseRef>,
    #[serde(default)]
    keys: BTreeMap<DocumentCategory, String>,
}

impl PageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_category(&self) -> DocumentCategory {
        self.current_category
    }

    pub fn current_document(&self) -> Option<&DocumentId> {
        self.documents.get(&self.current_category)
    }

    pub fn document(&self, category: DocumentCategory) -> Option<&DocumentId> {
        self.documents.get(&category)
    }

    pub fn is_document_set(&self, category: DocumentCategory) -> bool {
        self.documents.contains_key(&category)
    }

    pub fn verse(&self) -> Option<&VerseRef> {
        self.verse.as_ref()
    }

    pub fn current_location(&self) -> Option<Location> {
        self.location(self.current_category)
    }

    pub fn location(&self, category: DocumentCategory) -> Option<Location> {
        if category.is_verse_addressable() {
            self.verse.clone().map(Location::Verse)
        } else {
            self.keys.get(&category).cloned().map(Location::Key)
        }
    }

    /// Current document and location, if both are known.
    pub fn snapshot(&self) -> Option<PageSnapshot> {
        Some(PageSnapshot {
            category: self.current_category,
            document: self.current_document()?.clone(),
            location: self.current_location()?,
        })
    }

    /// True if the current document's locations can be synchronized with other panes.
    pub fn is_syncable(&self) -> bool {
        self.current_category.is_verse_addressable() && self.current_document().is_some()
    }

    /// Switch to a document, keeping that category's location cursor.
    pub fn set_current_document(&mut self, category: DocumentCategory, document: DocumentId) {
        self.current_category = category;
        self.documents.insert(category, document);
    }

    pub fn set_current_document_and_location(
        &mut self,
        category: DocumentCategory,
        document: DocumentId,
        location: Location,
    ) {
        self.set_current_document(category, document);
        self.set_location(category, location);
    }

    /// Move the cursor of `category`. A key location for a verse category (or the
    /// reverse) does not fit and is ignored.
    pub fn set_location(&mut self, category: DocumentCategory, location: Location) -> bool {
        match (category.is_verse_addressable(), location) {
            (true, Location::Verse(verse)) => {
                self.verse = Some(verse);
                true
            }
            (false, Location::Key(key)) => {
                self.keys.insert(category, key);
                true
            }
            (_, location) => {
                log::warn!(
                    "Location {} does not fit category {}",
                    location,
                    category.display_name()
                );
                false
            }
        }
    }

    /// Move the shared verse cursor regardless of the current category.
    pub fn set_verse(&mut self, verse: VerseRef) {
        self.verse = Some(verse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kjv() -> DocumentId {
        DocumentId::new("KJV")
    }

    #[test]
    fn bible_and_commentary_share_the_verse() {
        let mut page = PageManager::new();
        page.set_current_document_and_location(
            DocumentCategory::Bible,
            kjv(),
            Location::Verse(VerseRef::new("Ps", 139, 3)),
        );
        page.set_current_document(DocumentCategory::Commentary, DocumentId::new("MHC"));
        assert_eq!(
            page.current_location(),
            Some(Location::Verse(VerseRef::new("Ps", 139, 3)))
        );
        assert!(page.is_syncable());
    }

    #[test]
    fn switching_to_dictionary_keeps_verse() {
        let mut page = PageManager::new();
        page.set_current_document_and_location(
            DocumentCategory::Bible,
            kjv(),
            Location::Verse(VerseRef::new("Gen", 1, 1)),
        );
        page.set_current_document_and_location(
            DocumentCategory::Dictionary,
            DocumentId::new("Easton"),
            Location::Key("Grace".to_string()),
        );
        assert!(!page.is_syncable());
        assert_eq!(page.current_location(), Some(Location::Key("Grace".to_string())));
        assert_eq!(page.verse(), Some(&VerseRef::new("Gen", 1, 1)));
        assert_eq!(page.document(DocumentCategory::Bible), Some(&kjv()));
    }

    #[test]
    fn mismatched_location_is_ignored() {
        let mut page = PageManager::new();
        assert!(!page.set_location(DocumentCategory::Bible, Location::Key("x".to_string())));
        assert_eq!(page.verse(), None);
    }

    #[test]
    fn snapshot_needs_document_and_location() {
        let mut page = PageManager::new();
        assert!(page.snapshot().is_none());
        page.set_current_document(DocumentCategory::Bible, kjv());
        assert!(page.snapshot().is_none());
        page.set_verse(VerseRef::new("John", 3, 16));
        let snapshot = page.snapshot().unwrap();
        assert_eq!(snapshot.document, kjv());
        assert_eq!(snapshot.location, Location::Verse(VerseRef::new("John", 3, 16)));
    }

    #[test]
    fn persisted_form_round_trips() {
        let mut page = PageManager::new();
        page.set_current_document_and_location(
            DocumentCategory::GeneralBook,
            DocumentId::new("Pilgrim"),
            Location::Key("Part 1".to_string()),
        );
        page.set_verse(VerseRef::new("Rom", 8, 28));
        let json = serde_json::to_string(&page).unwrap();
        let restored: PageManager = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, page);
    }
}
