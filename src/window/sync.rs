//! Cross-pane synchronisation.
//!
//! When a synchronised pane moves, every other synchronised pane of the same
//! sync group follows. Passes are debounced and never overlap: the pass lock is
//! always taken before the repository lock.

use crate::window::debounce::Debouncer;
use crate::window::events::WindowEvent;
use crate::window::loader::TextLoader;
use crate::window::repository::{SharedRepository, WindowRepository};
use lectern_core::{DocumentCategory, Location, WindowId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Quiet period before a burst of sync requests runs as one pass.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Default)]
struct SyncState {
    last_force_sync_all: Option<Instant>,
    night_mode: bool,
    last_sync_was_in_night_mode: bool,
    passes: u64,
}

struct SyncInner {
    repo: SharedRepository,
    loader: TextLoader,
    state: Mutex<SyncState>,
}

pub struct WindowSync {
    inner: Arc<SyncInner>,
    debouncer: Debouncer<Option<WindowId>>,
}

impl WindowSync {
    pub fn new(repo: SharedRepository, loader: TextLoader, config: SyncConfig) -> Self {
        let inner = Arc::new(SyncInner {
            repo,
            loader,
            state: Mutex::new(SyncState::default()),
        });
        let pass = inner.clone();
        let debouncer = Debouncer::new(config.debounce, move |source| pass.run_pass(source));
        Self { inner, debouncer }
    }

    pub fn loader(&self) -> &TextLoader {
        &self.inner.loader
    }

    /// Bring other panes in line with `source` (or the resolved default source).
    ///
    /// With `no_delay` the pass runs now on the calling thread; otherwise calls
    /// are coalesced and the last source wins.
    pub fn synchronize_windows(&self, source: Option<WindowId>, no_delay: bool) {
        if no_delay {
            self.inner.run_pass(source);
        } else {
            self.debouncer.call(source);
        }
    }

    /// Drop a debounced pass that has not run yet.
    pub fn cancel_pending(&self) {
        self.debouncer.cancel();
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> u64 {
        self.inner.state.lock().passes
    }

    pub fn is_night_mode(&self) -> bool {
        self.inner.state.lock().night_mode
    }

    /// Switch display mode. The next pass reloads every pane.
    pub fn set_night_mode(&self, night_mode: bool) {
        self.inner.state.lock().night_mode = night_mode;
    }

    pub fn update_text_if_needed(&self, id: WindowId) {
        let force = self.inner.state.lock().last_force_sync_all;
        if let Some(task) = self.inner.loader.update_text_if_needed(id, force) {
            task.detach();
        }
    }

    /// Force every visible pane to reload its content.
    pub fn reload_all_windows(&self) {
        let force = {
            let mut state = self.inner.state.lock();
            let now = Instant::now();
            state.last_force_sync_all = Some(now);
            now
        };
        let visible: Vec<WindowId> = {
            let repo = self.inner.repo.lock();
            repo.windows()
                .iter()
                .map(|w| w.id())
                .filter(|id| repo.is_window_visible(*id))
                .collect()
        };
        log::debug!("Reloading {} visible windows", visible.len());
        for id in visible {
            if let Some(task) = self.inner.loader.update_text_if_needed(id, Some(force)) {
                task.detach();
            }
        }
    }
}

impl SyncInner {
    fn run_pass(&self, source: Option<WindowId>) {
        let mut state = self.state.lock();
        state.passes += 1;
        if state.night_mode != state.last_sync_was_in_night_mode {
            state.last_force_sync_all = Some(Instant::now());
            state.last_sync_was_in_night_mode = state.night_mode;
        }
        let force = state.last_force_sync_all;

        let loads = {
            let mut repo = self.repo.lock();
            plan_pass(&mut repo, source, force)
        };
        for id in loads {
            if let Some(task) = self.loader.load_text(id, false) {
                task.detach();
            }
        }
    }
}

fn resolve_source(repo: &WindowRepository, source: Option<WindowId>) -> WindowId {
    if let Some(id) = source.filter(|id| repo.window(*id).is_some()) {
        return id;
    }
    let active = repo.active_window_id();
    let active_synchronised = repo.window(active).is_some_and(|w| w.is_synchronised());
    if !active_synchronised {
        if let Some(last) = repo.last_sync_window_id() {
            return last;
        }
    }
    active
}

/// Move followers of the source and return the panes that need a full load.
/// Scrolls are issued directly.
fn plan_pass(
    repo: &mut WindowRepository,
    source: Option<WindowId>,
    force: Option<Instant>,
) -> Vec<WindowId> {
    let source_id = resolve_source(repo, source);
    let mut loads = Vec::new();
    let mut updated = HashSet::new();

    let origin = repo
        .window(source_id)
        .filter(|w| w.is_syncable() && w.is_synchronised())
        .and_then(|w| w.page_manager.verse().cloned().map(|v| (v, w.sync_group())));

    if let Some((verse, group)) = origin {
        log::debug!("Synchronizing group {} to {} from window {}", group, verse, source_id);
        let followers: Vec<WindowId> = repo
            .windows()
            .iter()
            .filter(|w| w.id() != source_id && w.is_synchronised() && w.sync_group() == group)
            .map(|w| w.id())
            .collect();
        for id in followers {
            let visible = repo.is_window_visible(id);
            let Some(window) = repo.window_mut(id) else {
                continue;
            };
            window.page_manager.set_verse(verse.clone());
            let category = window.page_manager.current_category();
            let shown = window.displayed().map(|d| d.location.clone());
            let moved = window.page_manager.current_location() != shown;
            let stale = window.is_stale(force);

            if category.is_verse_addressable() && visible && (stale || moved) {
                update_inactive_window(repo, id, shown, stale, &mut loads);
                updated.insert(id);
            }
        }
    }

    let stale: Vec<WindowId> = repo
        .windows()
        .iter()
        .filter(|w| {
            !updated.contains(&w.id()) && repo.is_window_visible(w.id()) && w.is_stale(force)
        })
        .map(|w| w.id())
        .collect();
    for id in stale {
        update_inactive_window(repo, id, None, true, &mut loads);
    }
    loads
}

/// Scroll when the target is inside content the view already holds, skip
/// initialised panes whose position would be lost, load otherwise.
fn update_inactive_window(
    repo: &mut WindowRepository,
    id: WindowId,
    shown: Option<Location>,
    force: bool,
    loads: &mut Vec<WindowId>,
) {
    let views = repo.views().clone();
    let Some(window) = repo.window(id) else {
        return;
    };
    let category = window.page_manager.current_category();
    let current = window.page_manager.current_location();

    if !force && category.is_verse_addressable() {
        if let (Some(Location::Verse(before)), Some(Location::Verse(now))) = (&shown, &current) {
            if before.is_same_division(now) && views.has_page_loaded(id, &now.division()) {
                let location = Location::Verse(now.clone());
                repo.events().publish(WindowEvent::ScrollRequest {
                    window_id: id,
                    location: location.clone(),
                });
                if let Some(window) = repo.window_mut(id) {
                    window.mark_scrolled(location);
                }
                return;
            }
        }
    }

    let keeps_position = !category.is_verse_addressable()
        || (category == DocumentCategory::Commentary && !window.is_synchronised());
    if keeps_position && views.is_initialized(id) {
        log::debug!("Window {} keeps its position", id);
        return;
    }
    loads.push(id);
}
