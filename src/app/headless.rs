use crate::persistence::WorkspaceStore;
use crate::settings::AppSettings;
use crate::window::content::{Content, ContentSource, DocumentViews, FetchError};
use crate::window::control::WindowControl;
use crate::window::debounce::Debouncer;
use crate::window::events::{EventBus, WindowEvent};
use crate::window::repository::{save_shared, WindowRepository};
use lectern_core::{DocumentCategory, DocumentId, Division, Location, VerseRef, WindowId, WorkspaceId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Renders a one-line text body for any document.
pub struct PlaceholderSource;

impl ContentSource for PlaceholderSource {
    fn fetch(&self, document: &DocumentId, location: &Location) -> Result<Content, FetchError> {
        Ok(Content::new(
            document.clone(),
            location.clone(),
            format!("[{}] {}", document, location),
        ))
    }
}

/// View registry without a screen. Every view is attached and logs what it shows.
#[derive(Default)]
pub struct LoggingViews {
    initialized: Mutex<HashSet<WindowId>>,
    loaded: Mutex<HashMap<WindowId, Division>>,
}

impl DocumentViews for LoggingViews {
    fn is_attached(&self, _window: WindowId) -> bool {
        true
    }

    fn is_initialized(&self, window: WindowId) -> bool {
        self.initialized.lock().contains(&window)
    }

    fn has_page_loaded(&self, window: WindowId, division: &Division) -> bool {
        self.loaded.lock().get(&window) == Some(division)
    }

    fn show(&self, window: WindowId, content: Content, _notify_location_change: bool) {
        if content.is_error {
            log::warn!("Window {} shows error page: {}", window, content.body);
        } else {
            log::info!("Window {} shows {}", window, content.body);
        }
        match content.location.as_verse() {
            Some(verse) => {
                self.loaded.lock().insert(window, verse.division());
            }
            None => {
                self.loaded.lock().remove(&window);
            }
        }
        self.initialized.lock().insert(window);
    }

    fn destroy(&self, window: WindowId) {
        self.initialized.lock().remove(&window);
        self.loaded.lock().remove(&window);
    }
}

/// Headless application: a window controller over a store, with debounced
/// auto-save whenever the layout changes.
pub struct HeadlessApp {
    control: WindowControl,
    saver: Arc<Debouncer<()>>,
    _autosave: smol::Task<()>,
}

impl HeadlessApp {
    pub fn new(settings: &AppSettings, store: Arc<dyn WorkspaceStore>) -> Self {
        let (events, rx) = EventBus::new();
        let views: Arc<dyn DocumentViews> = Arc::new(LoggingViews::default());
        let workspace_id = settings.active_workspace.unwrap_or_else(WorkspaceId::new);

        let mut repo = WindowRepository::new(workspace_id, store, views, events);
        repo.load_from_db(workspace_id);
        let control = WindowControl::new(
            repo,
            Arc::new(PlaceholderSource),
            settings.sync_config(),
            settings.loader_config(),
        );
        control.window_sync().set_night_mode(settings.night_mode);

        let repo = control.repository().clone();
        let saver = Arc::new(Debouncer::new(AUTOSAVE_DELAY, move |()| save_shared(&repo)));
        let pending = saver.clone();
        let autosave = smol::spawn(async move {
            while let Ok(event) = rx.recv().await {
                match event {
                    WindowEvent::LayoutChanged
                    | WindowEvent::NumberOfWindowsChanged
                    | WindowEvent::WindowChanged { .. } => pending.call(()),
                    WindowEvent::ActiveWindowChanged { .. } | WindowEvent::ScrollRequest { .. } => {}
                }
            }
        });

        Self {
            control,
            saver,
            _autosave: autosave,
        }
    }

    pub fn control(&self) -> &WindowControl {
        &self.control
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.control.repository().lock().workspace_id()
    }

    /// Give empty panes a starting document, load every visible pane and synchronise.
    pub fn run(&self) {
        {
            let mut repo = self.control.repository().lock();
            let empty: Vec<WindowId> = repo
                .windows()
                .iter()
                .filter(|w| w.page_manager.current_document().is_none())
                .map(|w| w.id())
                .collect();
            for id in empty {
                if let Some(window) = repo.window_mut(id) {
                    window.page_manager.set_current_document_and_location(
                        DocumentCategory::Bible,
                        DocumentId::new("KJV"),
                        Location::Verse(VerseRef::new("Gen", 1, 1)),
                    );
                }
            }
        }

        self.control.synchronize_windows(None, true);
        let visible: Vec<WindowId> = {
            let repo = self.control.repository().lock();
            repo.visible_windows().iter().map(|w| w.id()).collect()
        };
        for id in visible {
            if let Some(task) = self.control.window_sync().loader().load_text(id, false) {
                smol::block_on(task);
            }
        }
        self.control.save();
    }

    /// One line per pane in display order.
    pub fn layout_summary(&self) -> String {
        let repo = self.control.repository().lock();
        let mut out = format!("Workspace {} ({} windows)\n", repo.workspace_id(), repo.windows().len());
        for window in repo.sorted_windows() {
            let id = window.id();
            let location = window
                .page_manager
                .current_location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{}{} {:<9} weight {:.2} group {}{}{} {}",
                if id == repo.active_window_id() { "*" } else { " " },
                window,
                window.layout.state.as_str(),
                repo.effective_weight(id).unwrap_or_default(),
                window.sync_group(),
                if window.is_pin_mode() { " pinned" } else { "" },
                if window.is_links_window() { " links" } else { "" },
                location,
            );
        }
        out
    }

    /// Save and release every view.
    pub fn shutdown(&self) {
        self.saver.cancel();
        self.control.unload();
    }
}
