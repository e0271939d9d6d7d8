//! Window layout operations
//!
//! Adding, closing, minimising, restoring, maximising, resizing and reordering panes.

use super::WindowControl;
use crate::window::layout::WindowState;
use lectern_core::{DocumentCategory, DocumentId, Location, WindowId};

enum RestoreToggle {
    Close,
    Minimise,
}

impl WindowControl {
    /// Split: add a pane cloned from `source` (or the active pane) and activate it.
    pub fn add_new_window(&self, source: Option<WindowId>) -> WindowId {
        let id = {
            let mut repo = self.repo.lock();
            let id = repo.add_new_window(source);
            repo.set_active_window(id);
            id
        };
        self.number_of_windows_changed();
        self.sync.reload_all_windows();
        id
    }

    /// Add an unsynchronised pane showing `document` at `location`.
    pub fn add_new_window_at(
        &self,
        category: DocumentCategory,
        document: DocumentId,
        location: Location,
    ) -> WindowId {
        let id = {
            let mut repo = self.repo.lock();
            let mut page = repo
                .active_window()
                .map(|w| w.page_manager.clone())
                .unwrap_or_default();
            page.set_current_document_and_location(category, document, location);
            let id = repo.add_window_with_page(page);
            repo.set_active_window(id);
            id
        };
        self.number_of_windows_changed();
        self.sync.update_text_if_needed(id);
        id
    }

    /// Minimise a pane. Refused when it would leave no visible pane, unless forced.
    pub fn minimise_window(&self, id: WindowId, force: bool) -> bool {
        {
            let mut repo = self.repo.lock();
            if repo.window(id).is_none() {
                return false;
            }
            if !force && repo.visible_windows().len() < 2 {
                log::info!("Not minimising window {}: it is the only visible window", id);
                return false;
            }
            repo.minimise(id);
        }
        self.number_of_windows_changed();
        true
    }

    /// Close a pane for good. Refused for the last pane.
    pub fn close_window(&self, id: WindowId) -> bool {
        {
            let mut repo = self.repo.lock();
            if !repo.is_window_removable(id) {
                log::info!("Window {} cannot be closed", id);
                return false;
            }
            if !repo.close(id) {
                return false;
            }
            repo.reset_single_window_weight();
        }
        self.number_of_windows_changed();
        self.sync.reload_all_windows();
        true
    }

    /// Make a pane visible and active.
    ///
    /// Restoring an unpinned pane minimises every other unpinned pane. Restoring
    /// a pane that is already visible toggles it away instead, unless forced.
    pub fn restore_window(&self, id: WindowId, force: bool) -> bool {
        let toggle = {
            let repo = self.repo.lock();
            let Some(window) = repo.window(id) else {
                log::warn!("Cannot restore unknown window {}", id);
                return false;
            };
            if !force && repo.is_window_visible(id) {
                let secondary_links = window.is_links_window()
                    && repo.links_depth(id) == 0
                    && repo.primary_links_window_id() != Some(id);
                Some(if secondary_links {
                    RestoreToggle::Close
                } else {
                    RestoreToggle::Minimise
                })
            } else {
                None
            }
        };
        match toggle {
            Some(RestoreToggle::Close) => return self.close_window(id),
            Some(RestoreToggle::Minimise) => return self.minimise_window(id, false),
            None => {}
        }

        let sync_source = {
            let mut repo = self.repo.lock();
            let previous = repo.active_window_id();
            let pinned = repo.window(id).is_some_and(|w| w.is_pin_mode());
            if !pinned {
                let others: Vec<WindowId> = repo
                    .windows()
                    .iter()
                    .filter(|w| w.id() != id && !w.is_pin_mode() && w.layout.is_visible_state())
                    .map(|w| w.id())
                    .collect();
                for other in others {
                    repo.set_window_state(other, WindowState::Minimised);
                }
            }
            repo.set_window_state(id, WindowState::Visible);
            repo.set_active_window(id);
            if repo.is_maximized() {
                repo.set_maximized_window(Some(id));
            }

            let previous_synchronised =
                previous != id && repo.window(previous).is_some_and(|w| w.is_synchronised());
            if previous_synchronised {
                repo.set_last_sync_window_id(Some(previous));
                Some(previous)
            } else {
                None
            }
        };
        self.number_of_windows_changed();
        if let Some(source) = sync_source {
            self.sync.synchronize_windows(Some(source), true);
        }
        self.sync.update_text_if_needed(id);
        true
    }

    pub fn maximise_window(&self, id: WindowId) {
        {
            let mut repo = self.repo.lock();
            if repo.window(id).is_none() {
                log::warn!("Cannot maximise unknown window {}", id);
                return;
            }
            repo.set_maximized_window(Some(id));
            repo.set_active_window(id);
        }
        self.number_of_windows_changed();
        self.sync.update_text_if_needed(id);
    }

    /// Leave maximised mode and catch the other panes up with the maximised one.
    pub fn un_maximise(&self) {
        let maximized = {
            let mut repo = self.repo.lock();
            let maximized = repo.maximized_window_id();
            repo.set_maximized_window(None);
            maximized
        };
        let Some(maximized) = maximized else {
            return;
        };
        self.number_of_windows_changed();
        self.sync.synchronize_windows(Some(maximized), true);
    }

    pub fn set_window_weight(&self, id: WindowId, weight: f32) -> bool {
        let changed = self.repo.lock().set_window_weight(id, weight);
        if changed {
            self.layout_changed();
        }
        changed
    }

    pub fn move_window_to_position(&self, id: WindowId, position: usize) -> bool {
        let moved = self.repo.lock().move_window_to_position(id, position);
        if moved {
            self.layout_changed();
        }
        moved
    }

    pub fn set_pin_mode(&self, id: WindowId, value: bool) {
        if !self.repo.lock().set_pin_mode(id, value) {
            return;
        }
        self.layout_changed();
        self.sync.synchronize_windows(None, false);
    }

    pub fn set_auto_pin(&self, auto_pin: bool) {
        self.repo.lock().set_auto_pin(auto_pin);
        self.layout_changed();
    }

    pub fn is_window_removable(&self, id: WindowId) -> bool {
        self.repo.lock().is_window_removable(id)
    }

    pub fn is_window_minimisable(&self, id: WindowId) -> bool {
        self.repo.lock().is_window_minimisable(id)
    }

    pub fn is_multi_window(&self) -> bool {
        self.repo.lock().is_multi_window()
    }

    pub fn is_single_window(&self) -> bool {
        self.repo.lock().is_single_window()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixture, settle};
    use crate::window::events::WindowEvent;
    use crate::window::layout::WindowState;
    use crate::window::test_support::drain;
    use lectern_core::{DocumentCategory, DocumentId, Location, VerseRef, WindowId};

    fn visible_ids(f: &super::super::tests::Fixture) -> Vec<WindowId> {
        f.control
            .repository()
            .lock()
            .visible_windows()
            .iter()
            .map(|w| w.id())
            .collect()
    }

    #[test]
    fn add_new_window_activates_and_announces() {
        let f = fixture();
        let first = f.control.active_window_id();
        let second = f.control.add_new_window(None);
        assert_eq!(f.control.active_window_id(), second);
        let events = drain(&f.rx);
        assert!(events.contains(&WindowEvent::NumberOfWindowsChanged));
        assert!(events.contains(&WindowEvent::ActiveWindowChanged { window_id: second }));
        settle();
        assert_eq!(f.views.shown_for(first).len(), 1);
        assert_eq!(f.views.shown_for(second).len(), 1);
    }

    #[test]
    fn add_new_window_at_shows_document_unsynchronised() {
        let f = fixture();
        let id = f.control.add_new_window_at(
            DocumentCategory::Commentary,
            DocumentId::new("MHC"),
            Location::Verse(VerseRef::new("John", 1, 1)),
        );
        settle();
        let repo = f.control.repository().lock();
        let window = repo.window(id).unwrap();
        assert!(!window.is_synchronised());
        assert_eq!(window.page_manager.current_category(), DocumentCategory::Commentary);
        drop(repo);
        let shown = f.views.shown_for(id);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].document, DocumentId::new("MHC"));
    }

    #[test]
    fn last_visible_window_is_not_minimised_unless_forced() {
        let f = fixture();
        let first = f.control.active_window_id();
        assert!(!f.control.minimise_window(first, false));
        assert!(f.control.minimise_window(first, true));
        let repo = f.control.repository().lock();
        assert!(!repo.windows().is_empty());
        assert!(repo.is_window_visible(repo.active_window_id()));
    }

    #[test]
    fn close_is_refused_for_last_window() {
        let f = fixture();
        let first = f.control.active_window_id();
        assert!(!f.control.close_window(first));
        assert_eq!(f.control.repository().lock().windows().len(), 1);
    }

    #[test]
    fn closing_down_to_one_window_resets_its_weight() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        let c = f.control.add_new_window(Some(b));
        {
            let mut repo = f.control.repository().lock();
            for (id, weight) in [(a, 0.3), (b, 0.3), (c, 0.4)] {
                repo.window_mut(id).unwrap().layout.set_weight(weight);
            }
        }
        assert!(f.control.close_window(a));
        assert!(f.control.close_window(b));

        let repo = f.control.repository().lock();
        assert_eq!(repo.windows().len(), 1);
        assert_eq!(repo.effective_weight(c), Some(1.0));
        assert_eq!(repo.window(c).unwrap().layout.weight(), 1.0);
    }

    #[test]
    fn restoring_unpinned_window_minimises_other_unpinned() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        let c = f.control.add_new_window(Some(b));
        let pinned = f.control.add_new_window(Some(c));
        f.control.set_pin_mode(pinned, true);
        f.control.minimise_window(b, false);

        assert!(f.control.restore_window(b, false));
        let repo = f.control.repository().lock();
        for window in repo.windows() {
            if window.id() != b && !window.is_pin_mode() {
                assert_ne!(window.layout.state, WindowState::Visible);
            }
        }
        assert!(repo.is_window_visible(b));
        assert!(repo.is_window_visible(pinned));
        assert_eq!(repo.active_window_id(), b);
    }

    #[test]
    fn restoring_visible_window_toggles_it_minimised() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        assert!(f.control.restore_window(b, false));
        let repo = f.control.repository().lock();
        assert_eq!(repo.window(b).unwrap().layout.state, WindowState::Minimised);
        assert_eq!(repo.active_window_id(), a);
    }

    #[test]
    fn restoring_visible_secondary_links_window_closes_it() {
        let f = fixture();
        let a = f.control.active_window_id();
        let secondary = {
            let mut repo = f.control.repository().lock();
            let primary = repo.target_links_window(a).unwrap();
            let secondary = repo.target_links_window(primary).unwrap();
            // Orphan the chained window so it sits at depth 0 without being primary.
            repo.window_mut(primary).unwrap().target_links_window_id = None;
            secondary
        };
        assert!(f.control.restore_window(secondary, false));
        assert!(f.control.repository().lock().window(secondary).is_none());
    }

    #[test]
    fn restore_makes_previous_synchronised_window_the_source() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        f.control.minimise_window(b, false);
        f.control.set_active_window(a);
        f.control
            .repository()
            .lock()
            .window_mut(a)
            .unwrap()
            .page_manager
            .set_verse(VerseRef::new("Acts", 2, 1));

        f.control.restore_window(b, false);
        let repo = f.control.repository().lock();
        assert_eq!(repo.last_sync_window_id(), Some(a));
        assert_eq!(
            repo.window(b).unwrap().page_manager.verse(),
            Some(&VerseRef::new("Acts", 2, 1))
        );
    }

    #[test]
    fn maximise_round_trip_restores_visible_set_and_syncs() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        f.control.set_active_window(a);
        settle();
        let before = visible_ids(&f);

        f.control.maximise_window(a);
        assert_eq!(visible_ids(&f), vec![a]);
        f.control
            .repository()
            .lock()
            .window_mut(a)
            .unwrap()
            .page_manager
            .set_verse(VerseRef::new("Rev", 22, 21));
        f.control.window_sync().synchronize_windows(Some(a), true);
        settle();
        f.views.clear_shown();

        let passes = f.control.window_sync().passes();
        f.control.un_maximise();
        assert_eq!(f.control.window_sync().passes(), passes + 1);
        assert_eq!(visible_ids(&f), before);
        settle();
        let shown = f.views.shown_for(b);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].location, Location::Verse(VerseRef::new("Rev", 22, 21)));
    }

    #[test]
    fn weights_and_moves_publish_layout_changes() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        drain(&f.rx);
        assert!(f.control.set_window_weight(b, 0.25));
        assert!(!f.control.set_window_weight(b, 0.0));
        assert!(f.control.move_window_to_position(b, 0));
        assert!(!f.control.move_window_to_position(b, 5));
        assert_eq!(
            drain(&f.rx),
            vec![WindowEvent::LayoutChanged, WindowEvent::LayoutChanged]
        );
        let order: Vec<WindowId> = f
            .control
            .repository()
            .lock()
            .windows()
            .iter()
            .map(|w| w.id())
            .collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn controls_availability_follows_window_count() {
        let f = fixture();
        let a = f.control.active_window_id();
        assert!(f.control.is_single_window());
        assert!(!f.control.is_window_removable(a));
        assert!(!f.control.is_window_minimisable(a));
        let b = f.control.add_new_window(Some(a));
        assert!(f.control.is_multi_window());
        assert!(f.control.is_window_removable(b));
        assert!(f.control.is_window_minimisable(b));
    }
}
