//! Recording fakes for the content collaborators.

use crate::persistence::MemoryStore;
use crate::window::content::{Content, ContentSource, DocumentViews, FetchError};
use crate::window::events::{EventBus, WindowEvent};
use crate::window::page::PageManager;
use crate::window::repository::WindowRepository;
use async_channel::Receiver;
use lectern_core::{
    DocumentCategory, DocumentId, Division, Location, VerseRef, WindowId, WorkspaceId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct ViewState {
    detached: HashSet<WindowId>,
    initialized: HashSet<WindowId>,
    loaded: HashMap<WindowId, Division>,
    shown: Vec<(WindowId, Content, bool)>,
    destroyed: Vec<WindowId>,
}

#[derive(Default)]
struct QueryTiming {
    delay: Option<Duration>,
    finished: Vec<Instant>,
}

/// Views that attach immediately unless told otherwise and remember what they showed.
#[derive(Default)]
pub struct RecordingViews {
    state: Mutex<ViewState>,
    queries: Mutex<QueryTiming>,
}

impl RecordingViews {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn detach(&self, window: WindowId) {
        self.state.lock().detached.insert(window);
    }

    pub fn attach(&self, window: WindowId) {
        self.state.lock().detached.remove(&window);
    }

    pub fn shown(&self) -> Vec<(WindowId, Content, bool)> {
        self.state.lock().shown.clone()
    }

    pub fn shown_for(&self, window: WindowId) -> Vec<Content> {
        self.state
            .lock()
            .shown
            .iter()
            .filter(|(id, _, _)| *id == window)
            .map(|(_, content, _)| content.clone())
            .collect()
    }

    pub fn clear_shown(&self) {
        self.state.lock().shown.clear();
    }

    pub fn destroyed(&self) -> Vec<WindowId> {
        self.state.lock().destroyed.clone()
    }

    /// Make every `has_page_loaded` call take `delay`.
    pub fn slow_queries(&self, delay: Duration) {
        self.queries.lock().delay = Some(delay);
    }

    /// When each `has_page_loaded` call returned.
    pub fn query_finishes(&self) -> Vec<Instant> {
        self.queries.lock().finished.clone()
    }
}

impl DocumentViews for RecordingViews {
    fn is_attached(&self, window: WindowId) -> bool {
        !self.state.lock().detached.contains(&window)
    }

    fn is_initialized(&self, window: WindowId) -> bool {
        self.state.lock().initialized.contains(&window)
    }

    fn has_page_loaded(&self, window: WindowId, division: &Division) -> bool {
        let delay = self.queries.lock().delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let loaded = self.state.lock().loaded.get(&window) == Some(division);
        self.queries.lock().finished.push(Instant::now());
        loaded
    }

    fn show(&self, window: WindowId, content: Content, notify_location_change: bool) {
        let mut state = self.state.lock();
        match content.location.as_verse() {
            Some(verse) => {
                state.loaded.insert(window, verse.division());
            }
            None => {
                state.loaded.remove(&window);
            }
        }
        state.initialized.insert(window);
        state.shown.push((window, content, notify_location_change));
    }

    fn destroy(&self, window: WindowId) {
        let mut state = self.state.lock();
        state.loaded.remove(&window);
        state.initialized.remove(&window);
        state.destroyed.push(window);
    }
}

/// Source that renders a one-line body, optionally slowly or failing.
#[derive(Default)]
pub struct FakeSource {
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashMap<String, bool>>,
    fetches: Mutex<Vec<(DocumentId, Location)>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(&self, location: &str, delay: Duration) {
        self.delays.lock().insert(location.to_string(), delay);
    }

    /// Fail fetches of `document`; `out_of_memory` picks the error kind.
    pub fn fail(&self, document: &str, out_of_memory: bool) {
        self.failures.lock().insert(document.to_string(), out_of_memory);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }
}

impl ContentSource for FakeSource {
    fn fetch(&self, document: &DocumentId, location: &Location) -> Result<Content, FetchError> {
        self.fetches.lock().push((document.clone(), location.clone()));
        let delay = self.delays.lock().get(&location.to_string()).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let failure = self.failures.lock().get(document.as_str()).copied();
        match failure {
            Some(true) => Err(FetchError::OutOfMemory {
                document: document.clone(),
            }),
            Some(false) => Err(FetchError::Unavailable {
                document: document.clone(),
                reason: "not installed".to_string(),
            }),
            None => Ok(Content::new(
                document.clone(),
                location.clone(),
                format!("{} {}", document, location),
            )),
        }
    }
}

/// A fresh repository over a memory store with recording views.
pub fn repository() -> (WindowRepository, Arc<RecordingViews>, Arc<MemoryStore>, Receiver<WindowEvent>) {
    let views = RecordingViews::new();
    let store = Arc::new(MemoryStore::new());
    let (events, rx) = EventBus::new();
    let repo = WindowRepository::new(WorkspaceId::new(), store.clone(), views.clone(), events);
    (repo, views, store, rx)
}

pub fn drain(rx: &Receiver<WindowEvent>) -> Vec<WindowEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// KJV at the given verse.
pub fn bible_page(book: &str, chapter: u32, verse: u32) -> PageManager {
    let mut page = PageManager::new();
    page.set_current_document_and_location(
        DocumentCategory::Bible,
        DocumentId::new("KJV"),
        Location::Verse(VerseRef::new(book, chapter, verse)),
    );
    page
}
