//! Cross-reference display in links windows.

use super::WindowControl;
use crate::window::layout::WindowState;
use lectern_core::{DocumentCategory, DocumentId, Location, WindowId};

impl WindowControl {
    /// Show a cross-reference in the active pane's links window, creating it if needed.
    pub fn show_link(
        &self,
        category: DocumentCategory,
        document: DocumentId,
        location: Location,
    ) -> Option<WindowId> {
        let (links, appeared) = {
            let mut repo = self.repo.lock();
            let count = repo.windows().len();
            let active = repo.active_window_id();
            let links = repo.target_links_window(active)?;
            let appeared = repo.windows().len() != count || !repo.is_window_visible(links);

            let window = repo.window_mut(links)?;
            window
                .page_manager
                .set_current_document_and_location(category, document, location);
            repo.set_window_state(links, WindowState::Visible);
            repo.set_active_window(links);
            (links, appeared)
        };
        if appeared {
            self.number_of_windows_changed();
        }
        if let Some(task) = self.sync.loader().load_text(links, false) {
            task.detach();
        }
        Some(links)
    }

    /// Show a verse in the Bible of the links window, or failing that of the active pane.
    pub fn show_link_using_default_bible(&self, location: Location) -> Option<WindowId> {
        let document = {
            let repo = self.repo.lock();
            let active = repo.active_window_id();
            let bible_of = |id: WindowId| {
                repo.window(id)
                    .and_then(|w| w.page_manager.document(DocumentCategory::Bible).cloned())
            };
            repo.existing_links_window(active)
                .and_then(bible_of)
                .or_else(|| bible_of(active))
        };
        let Some(document) = document else {
            log::warn!("No Bible to show {} in", location);
            return None;
        };
        self.show_link(DocumentCategory::Bible, document, location)
    }
}
