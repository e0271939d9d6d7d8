//! Synchronisation settings, location intake and workspace switching.

use super::WindowControl;
use crate::window::repository::save_shared;
use lectern_core::{Location, WindowId, WorkspaceId};

impl WindowControl {
    /// Turn synchronisation of a pane on or off. Turning it on pulls the
    /// location of another synchronised pane of the same group.
    pub fn set_synchronised(&self, id: WindowId, value: bool) {
        let pull_from = {
            let mut repo = self.repo.lock();
            if !repo.set_synchronised(id, value) || !value {
                None
            } else {
                let group = repo.window(id).map(|w| w.sync_group());
                repo.windows()
                    .iter()
                    .find(|w| {
                        w.id() != id
                            && w.is_synchronised()
                            && w.is_syncable()
                            && Some(w.sync_group()) == group
                    })
                    .map(|w| w.id())
            }
        };
        self.layout_changed();
        if let Some(source) = pull_from {
            self.sync.synchronize_windows(Some(source), true);
        }
    }

    /// Move a pane to another sync group and catch it up with that group.
    pub fn set_sync_group(&self, id: WindowId, group: i32) {
        let pull_from = {
            let mut repo = self.repo.lock();
            if !repo.set_sync_group(id, group) {
                return;
            }
            repo.windows()
                .iter()
                .find(|w| {
                    w.id() != id
                        && w.is_synchronised()
                        && w.is_syncable()
                        && w.sync_group() == group
                })
                .map(|w| w.id())
        };
        self.layout_changed();
        self.sync.synchronize_windows(pull_from.or(Some(id)), true);
    }

    /// The user moved inside a pane's view.
    pub fn on_location_changed(&self, id: WindowId, location: Location) {
        {
            let mut repo = self.repo.lock();
            let Some(window) = repo.window_mut(id) else {
                log::warn!("Location change for unknown window {}", id);
                return;
            };
            let category = window.page_manager.current_category();
            if !window.page_manager.set_location(category, location.clone()) {
                return;
            }
            window.mark_scrolled(location);
            if window.is_synchronised() {
                repo.set_last_sync_window_id(Some(id));
            }
        }
        self.sync.synchronize_windows(Some(id), false);
    }

    pub fn synchronize_windows(&self, source: Option<WindowId>, no_delay: bool) {
        self.sync.synchronize_windows(source, no_delay);
    }

    pub fn reload_all_windows(&self) {
        self.sync.reload_all_windows();
    }

    /// Switch display mode; every pane reloads on the next pass.
    pub fn set_night_mode(&self, night_mode: bool) {
        if self.sync.is_night_mode() == night_mode {
            return;
        }
        self.sync.set_night_mode(night_mode);
        self.sync.synchronize_windows(None, false);
    }

    /// Persist the current workspace.
    pub fn save(&self) {
        save_shared(&self.repo);
    }

    /// Save the current workspace and load another one in its place.
    pub fn switch_workspace(&self, workspace_id: WorkspaceId) {
        self.sync.cancel_pending();
        {
            let mut repo = self.repo.lock();
            if repo.workspace_id() == workspace_id {
                return;
            }
            repo.save_into_db();
            repo.load_from_db(workspace_id);
        }
        self.number_of_windows_changed();
        self.sync.reload_all_windows();
    }

    /// Save and release every live view.
    pub fn unload(&self) {
        self.sync.cancel_pending();
        let mut repo = self.repo.lock();
        repo.save_into_db();
        repo.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixture, settle};
    use crate::window::test_support::drain;
    use crate::window::events::WindowEvent;
    use lectern_core::{Location, VerseRef, WindowId, WorkspaceId};
    use std::time::Duration;

    fn verse_of(f: &super::super::tests::Fixture, id: WindowId) -> Option<VerseRef> {
        f.control
            .repository()
            .lock()
            .window(id)
            .unwrap()
            .page_manager
            .verse()
            .cloned()
    }

    #[test]
    fn location_change_propagates_after_debounce() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        f.control.on_location_changed(a, Location::Verse(VerseRef::new("Ps", 23, 1)));
        assert_eq!(verse_of(&f, b), Some(VerseRef::new("Gen", 1, 1)));
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(verse_of(&f, b), Some(VerseRef::new("Ps", 23, 1)));
        assert_eq!(f.control.repository().lock().last_sync_window_id(), Some(a));
    }

    #[test]
    fn unsynchronised_window_does_not_lead() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        f.control.set_synchronised(b, false);
        f.control.on_location_changed(b, Location::Verse(VerseRef::new("Ps", 23, 1)));
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(verse_of(&f, a), Some(VerseRef::new("Gen", 1, 1)));
        assert_eq!(f.control.repository().lock().last_sync_window_id(), None);
    }

    #[test]
    fn resynchronising_pulls_from_group() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        f.control.set_synchronised(b, false);
        drain(&f.rx);
        f.control
            .repository()
            .lock()
            .window_mut(a)
            .unwrap()
            .page_manager
            .set_verse(VerseRef::new("Prov", 3, 5));

        f.control.set_synchronised(b, true);
        assert_eq!(verse_of(&f, b), Some(VerseRef::new("Prov", 3, 5)));
        assert!(drain(&f.rx).contains(&WindowEvent::WindowChanged { window_id: b }));
    }

    #[test]
    fn changing_sync_group_joins_the_new_group() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        let c = f.control.add_new_window(Some(b));
        f.control.set_sync_group(c, 1);
        f.control
            .repository()
            .lock()
            .window_mut(c)
            .unwrap()
            .page_manager
            .set_verse(VerseRef::new("Dan", 6, 22));
        f.control.set_sync_group(b, 1);
        assert_eq!(verse_of(&f, b), Some(VerseRef::new("Dan", 6, 22)));
        assert_eq!(verse_of(&f, a), Some(VerseRef::new("Gen", 1, 1)));
    }

    #[test]
    fn night_mode_reloads_visible_windows() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        settle();
        f.views.clear_shown();
        f.control.set_night_mode(true);
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(f.views.shown_for(a).len(), 1);
        assert_eq!(f.views.shown_for(b).len(), 1);
        f.views.clear_shown();
        f.control.set_night_mode(true);
        std::thread::sleep(Duration::from_millis(500));
        assert!(f.views.shown().is_empty());
    }

    #[test]
    fn switching_workspace_saves_and_loads() {
        let f = fixture();
        let a = f.control.active_window_id();
        let b = f.control.add_new_window(Some(a));
        let (first, store) = {
            let repo = f.control.repository().lock();
            (repo.workspace_id(), repo.store().clone())
        };

        let second = WorkspaceId::new();
        f.control.switch_workspace(second);
        {
            let repo = f.control.repository().lock();
            assert_eq!(repo.workspace_id(), second);
            assert_eq!(repo.windows().len(), 1);
        }
        assert!(f.views.destroyed().contains(&a));
        assert_eq!(store.windows(first).unwrap().len(), 2);

        f.control.switch_workspace(first);
        let repo = f.control.repository().lock();
        let ids: Vec<WindowId> = repo.windows().iter().map(|w| w.id()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.windows(second).unwrap().len(), 1);
    }

    #[test]
    fn unload_saves_and_releases_views() {
        let f = fixture();
        let a = f.control.active_window_id();
        f.control.unload();
        assert!(f.views.destroyed().contains(&a));
        let repo = f.control.repository().lock();
        assert_eq!(repo.store().windows(repo.workspace_id()).unwrap().len(), 1);
    }
}
