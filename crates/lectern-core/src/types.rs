use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an installed document. Only categories whose locations are
/// verses can be compared across panes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    #[default]
    Bible,
    Commentary,
    Dictionary,
    GeneralBook,
    Map,
}

impl DocumentCategory {
    /// True for the categories that share a comparable verse location.
    pub fn is_verse_addressable(self) -> bool {
        matches!(self, DocumentCategory::Bible | DocumentCategory::Commentary)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DocumentCategory::Bible => "Bible",
            DocumentCategory::Commentary => "Commentary",
            DocumentCategory::Dictionary => "Dictionary",
            DocumentCategory::GeneralBook => "General book",
            DocumentCategory::Map => "Map",
        }
    }
}

/// Identifier of an installed document (its module abbreviation, e.g. "KJV").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single verse.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// The chapter this verse belongs to.
    pub fn division(&self) -> Division {
        Division {
            book: self.book.clone(),
            chapter: self.chapter,
        }
    }

    pub fn is_same_division(&self, other: &VerseRef) -> bool {
        self.book == other.book && self.chapter == other.chapter
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// A major division of a document (a chapter). Content views load whole
/// divisions, so scrolling inside one does not need a reload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Division {
    pub book: String,
    pub chapter: u32,
}

/// Position inside a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Location {
    /// Verse location of Bibles and commentaries.
    Verse(VerseRef),
    /// Opaque key of dictionaries, general books and maps.
    Key(String),
}

impl Location {
    pub fn as_verse(&self) -> Option<&VerseRef> {
        match self {
            Location::Verse(verse) => Some(verse),
            Location::Key(_) => None,
        }
    }
}

impl From<VerseRef> for Location {
    fn from(verse: VerseRef) -> Self {
        Location::Verse(verse)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Verse(verse) => verse.fmt(f),
            Location::Key(key) => f.write_str(key),
        }
    }
}
