//! Ordered pane collection of one workspace.
//!
//! All structural state (the pane list, the active pane, maximisation and the
//! primary links pane) is mutated only through this type. It is shared between
//! the controller and the synchronisation engine as [`SharedRepository`].

use crate::persistence::{
    PageManagerEntity, WindowEntity, WorkspaceEntity, WorkspaceSettings, WorkspaceStore,
};
use crate::window::content::DocumentViews;
use crate::window::events::{EventBus, WindowEvent};
use crate::window::layout::{is_valid_weight, WindowState, DEFAULT_WEIGHT};
use crate::window::page::PageManager;
use crate::window::window::Window;
use lectern_core::{WindowId, WorkspaceId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

pub type SharedRepository = Arc<Mutex<WindowRepository>>;

/// Persisted form of a whole workspace, detached from the collection.
pub struct WorkspaceRows {
    store: Arc<dyn WorkspaceStore>,
    workspace: WorkspaceEntity,
    windows: Vec<WindowEntity>,
    pages: Vec<PageManagerEntity>,
}

impl WorkspaceRows {
    /// Write every row. Failures are logged.
    pub fn write(self) {
        let id = self.workspace.id;
        if let Err(e) = self.store.save_workspace(&self.workspace) {
            log::error!("Failed to save workspace {}: {}", id, e);
            return;
        }
        if let Err(e) = self.store.save_windows(id, &self.windows, &self.pages) {
            log::error!("Failed to save windows of workspace {}: {}", id, e);
            return;
        }
        log::debug!("Saved workspace {} with {} windows", id, self.windows.len());
    }
}

/// Save a shared collection, writing only after its lock is released.
pub fn save_shared(repo: &SharedRepository) {
    let rows = repo.lock().rows_for_save();
    rows.write();
}

pub struct WindowRepository {
    workspace_id: WorkspaceId,
    name: String,
    settings: WorkspaceSettings,
    windows: Vec<Window>,
    active_window_id: WindowId,
    maximized_window_id: Option<WindowId>,
    primary_links_window_id: Option<WindowId>,
    /// Shared size of every unpinned pane, when set.
    unpinned_weight: Option<f32>,
    /// Synchronised pane that last moved, used when the active pane is not synchronised.
    last_sync_window_id: Option<WindowId>,
    store: Arc<dyn WorkspaceStore>,
    views: Arc<dyn DocumentViews>,
    events: EventBus,
}

impl WindowRepository {
    /// Empty workspace holding a single default pane.
    pub fn new(
        workspace_id: WorkspaceId,
        store: Arc<dyn WorkspaceStore>,
        views: Arc<dyn DocumentViews>,
        events: EventBus,
    ) -> Self {
        let settings = WorkspaceSettings::default();
        let first = Window::new(workspace_id, PageManager::new(), settings.auto_pin);
        Self {
            workspace_id,
            name: String::new(),
            settings,
            active_window_id: first.id(),
            windows: vec![first],
            maximized_window_id: None,
            primary_links_window_id: None,
            unpinned_weight: None,
            last_sync_window_id: None,
            store,
            views,
            events,
        }
    }

    pub fn into_shared(self) -> SharedRepository {
        Arc::new(Mutex::new(self))
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn views(&self) -> &Arc<dyn DocumentViews> {
        &self.views
    }

    pub fn store(&self) -> &Arc<dyn WorkspaceStore> {
        &self.store
    }

    // === Lookup ===

    /// Panes in list order.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id() == id)
    }

    pub(crate) fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    fn index_of(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id() == id)
    }

    pub fn active_window_id(&self) -> WindowId {
        self.active_window_id
    }

    pub fn active_window(&self) -> Option<&Window> {
        self.window(self.active_window_id)
    }

    pub fn maximized_window_id(&self) -> Option<WindowId> {
        self.maximized_window_id
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized_window_id.is_some()
    }

    pub fn primary_links_window_id(&self) -> Option<WindowId> {
        self.primary_links_window_id
    }

    pub fn unpinned_weight(&self) -> Option<f32> {
        self.unpinned_weight
    }

    pub fn last_sync_window_id(&self) -> Option<WindowId> {
        self.last_sync_window_id
    }

    pub fn set_last_sync_window_id(&mut self, id: Option<WindowId>) {
        self.last_sync_window_id = id.filter(|id| self.window(*id).is_some());
    }

    /// Links panes last, pinned panes before unpinned ones. List order otherwise.
    pub fn sorted_windows(&self) -> Vec<&Window> {
        let mut sorted: Vec<&Window> = self.windows.iter().collect();
        sorted.sort_by_key(|w| (w.is_links_window(), !w.is_pin_mode()));
        sorted
    }

    pub fn is_window_visible(&self, id: WindowId) -> bool {
        if let Some(max_id) = self.maximized_window_id {
            if let Some(maximized) = self.window(max_id) {
                return id == max_id || maximized.target_links_window_id() == Some(id);
            }
        }
        self.window(id).is_some_and(|w| w.layout.is_visible_state())
    }

    pub fn visible_windows(&self) -> Vec<&Window> {
        if let Some(maximized) = self.maximized_window_id.and_then(|id| self.window(id)) {
            return vec![maximized];
        }
        self.sorted_windows()
            .into_iter()
            .filter(|w| w.layout.is_visible_state())
            .collect()
    }

    pub fn is_multi_window(&self) -> bool {
        self.visible_windows().len() > 1
    }

    pub fn is_single_window(&self) -> bool {
        !self.is_multi_window()
    }

    pub fn is_window_removable(&self, id: WindowId) -> bool {
        self.windows.len() > 1 && self.window(id).is_some()
    }

    pub fn is_window_minimisable(&self, id: WindowId) -> bool {
        self.is_multi_window() && self.window(id).is_some_and(|w| !w.is_links_window())
    }

    /// Size of a pane: its own weight when pinned, the shared unpinned weight otherwise.
    pub fn effective_weight(&self, id: WindowId) -> Option<f32> {
        let window = self.window(id)?;
        if window.is_pin_mode() {
            Some(window.layout.weight())
        } else {
            Some(self.unpinned_weight.unwrap_or(window.layout.weight()))
        }
    }

    // === Active pane ===

    pub fn set_active_window(&mut self, id: WindowId) {
        if self.window(id).is_none() {
            log::warn!("Cannot activate unknown window {}", id);
            return;
        }
        if self.active_window_id != id {
            self.active_window_id = id;
            self.events
                .publish(WindowEvent::ActiveWindowChanged { window_id: id });
        }
    }

    /// Activate the first visible pane, creating a default pane if none is visible.
    pub fn set_default_active_window(&mut self) {
        let visible = self
            .windows
            .iter()
            .map(|w| w.id())
            .find(|id| self.is_window_visible(*id));
        let id = match visible {
            Some(id) => id,
            None => {
                let window = Window::new(self.workspace_id, PageManager::new(), self.settings.auto_pin);
                log::info!("No visible window left, created {}", window);
                let id = window.id();
                self.windows.push(window);
                id
            }
        };
        self.set_active_window(id);
    }

    // === Creation ===

    /// Add a pane cloned from `source` (or the active pane) right after it.
    pub fn add_new_window(&mut self, source: Option<WindowId>) -> WindowId {
        let source_id = source
            .filter(|id| self.window(*id).is_some())
            .unwrap_or(self.active_window_id);
        let auto_pin = self.settings.auto_pin;
        let (mut window, insert_at) = match self.index_of(source_id) {
            Some(index) => {
                let source = &self.windows[index];
                let mut window =
                    Window::new(self.workspace_id, source.page_manager.clone(), auto_pin);
                if !source.is_links_window() {
                    window.set_synchronised(source.is_synchronised());
                    window.set_pin_mode(source.pin_mode_flag());
                    window.set_sync_group(source.sync_group());
                }
                window.layout.set_weight(source.layout.weight());
                let insert_at = if source.is_links_window() {
                    self.windows.len()
                } else {
                    index + 1
                };
                (window, insert_at)
            }
            None => (
                Window::new(self.workspace_id, PageManager::new(), auto_pin),
                self.windows.len(),
            ),
        };
        window.layout.state = WindowState::Visible;
        let id = window.id();
        log::info!("Adding {} after {}", window, source_id);
        self.windows.insert(insert_at, window);

        let active = self.active_window_id;
        if let Some(previous) = self.window_mut(active) {
            previous.layout.state = WindowState::Visible;
        }
        id
    }

    /// Add an unsynchronised pane showing `page`, after the active pane.
    pub fn add_window_with_page(&mut self, page: PageManager) -> WindowId {
        let id = self.add_new_window(None);
        if let Some(window) = self.window_mut(id) {
            window.page_manager = page;
            window.set_synchronised(false);
        }
        id
    }

    fn add_links_window(&mut self, parent: WindowId) -> WindowId {
        let page = self
            .window(parent)
            .map(|w| w.page_manager.clone())
            .unwrap_or_default();
        let window = Window::new_links_window(self.workspace_id, page, self.settings.auto_pin);
        let id = window.id();
        log::info!("Created links {} for {}", window, parent);
        self.windows.push(window);
        id
    }

    /// Links pane already receiving cross-references from `id`. Never creates one.
    pub fn existing_links_window(&self, id: WindowId) -> Option<WindowId> {
        let window = self.window(id)?;
        if let Some(target) = window.target_links_window_id() {
            if self.window(target).is_some() {
                return Some(target);
            }
        }
        if window.is_links_window() {
            return None;
        }
        self.primary_links_window_id
            .filter(|primary| self.window(*primary).is_some())
    }

    /// Pane that receives cross-references opened from `id`. May create a links pane.
    pub fn target_links_window(&mut self, id: WindowId) -> Option<WindowId> {
        if let Some(existing) = self.existing_links_window(id) {
            return Some(existing);
        }
        let from_links = self.window(id)?.is_links_window();
        let links = self.add_links_window(id);
        if from_links {
            if let Some(parent) = self.window_mut(id) {
                parent.target_links_window_id = Some(links);
            }
        } else {
            self.primary_links_window_id = Some(links);
        }
        Some(links)
    }

    /// How many links panes chain into this one. The primary links pane has depth 0.
    pub fn links_depth(&self, id: WindowId) -> usize {
        let mut depth = 0;
        let mut current = id;
        let mut visited = HashSet::from([id]);
        while let Some(parent) = self
            .windows
            .iter()
            .find(|w| w.is_links_window() && w.target_links_window_id() == Some(current))
        {
            if !visited.insert(parent.id()) {
                log::warn!("Links window chain through {} forms a cycle", parent);
                break;
            }
            depth += 1;
            current = parent.id();
        }
        depth
    }

    // === State changes ===

    pub fn set_window_state(&mut self, id: WindowId, state: WindowState) -> bool {
        match self.window_mut(id) {
            Some(window) => {
                window.layout.state = state;
                true
            }
            None => false,
        }
    }

    pub fn minimise(&mut self, id: WindowId) {
        if !self.set_window_state(id, WindowState::Minimised) {
            log::warn!("Cannot minimise unknown window {}", id);
            return;
        }
        if self.active_window_id == id {
            self.set_default_active_window();
        }
    }

    /// Close and forget a pane. Refused when it is the only pane.
    pub fn close(&mut self, id: WindowId) -> bool {
        if self.windows.len() < 2 {
            log::info!("Refusing to close the last window {}", id);
            return false;
        }
        let Some(index) = self.index_of(id) else {
            log::warn!("Cannot close unknown window {}", id);
            return false;
        };

        self.windows[index].layout.state = WindowState::Closed;
        if let Err(e) = self.store.delete_window(id) {
            log::error!("Failed to delete window {}: {}", id, e);
        }
        self.views.destroy(id);
        let window = self.windows.remove(index);
        log::info!("Closed {}", window);

        if self.primary_links_window_id == Some(id) {
            self.primary_links_window_id = None;
        }
        if self.maximized_window_id == Some(id) {
            self.maximized_window_id = None;
        }
        if self.last_sync_window_id == Some(id) {
            self.last_sync_window_id = None;
        }
        for other in &mut self.windows {
            if other.target_links_window_id == Some(id) {
                other.target_links_window_id = None;
            }
        }

        let any_visible = self.windows.iter().any(|w| self.is_window_visible(w.id()));
        if !any_visible {
            let nearest = index.min(self.windows.len() - 1);
            let window = &mut self.windows[nearest];
            window.layout.state = WindowState::Visible;
            let nearest_id = window.id();
            self.set_active_window(nearest_id);
        } else if self.active_window_id == id || !self.is_window_visible(self.active_window_id) {
            self.set_default_active_window();
        }
        true
    }

    pub fn set_maximized_window(&mut self, id: Option<WindowId>) {
        self.maximized_window_id = id.filter(|id| self.window(*id).is_some());
    }

    /// Reorder a pane within its pin class. Out-of-range positions are ignored.
    pub fn move_window_to_position(&mut self, id: WindowId, position: usize) -> bool {
        let Some(pinned) = self.window(id).map(|w| w.is_pin_mode()) else {
            log::warn!("Attempt to move missing window {}", id);
            return false;
        };
        let class_size = self
            .windows
            .iter()
            .filter(|w| w.is_pin_mode() == pinned)
            .count();
        if position >= class_size {
            log::warn!(
                "Attempt to move window {} to {} beyond end of its {} windows",
                id,
                position,
                class_size
            );
            return false;
        }

        let (mut pinned_windows, mut unpinned_windows): (Vec<Window>, Vec<Window>) =
            std::mem::take(&mut self.windows)
                .into_iter()
                .partition(|w| w.is_pin_mode());
        let class = if pinned {
            &mut pinned_windows
        } else {
            &mut unpinned_windows
        };
        if let Some(from) = class.iter().position(|w| w.id() == id) {
            let window = class.remove(from);
            class.insert(position, window);
        }
        pinned_windows.append(&mut unpinned_windows);
        self.windows = pinned_windows;
        true
    }

    /// Store the weight of a pane. Rejects non-positive weights.
    pub fn set_window_weight(&mut self, id: WindowId, weight: f32) -> bool {
        if !is_valid_weight(weight) {
            log::warn!("Rejecting weight {} for window {}", weight, id);
            return false;
        }
        let Some(window) = self.window_mut(id) else {
            return false;
        };
        if window.is_pin_mode() {
            window.layout.set_weight(weight)
        } else {
            self.unpinned_weight = Some(weight);
            true
        }
    }

    /// Give the single remaining visible pane the full size.
    pub(crate) fn reset_single_window_weight(&mut self) {
        let visible: Vec<WindowId> = self.visible_windows().iter().map(|w| w.id()).collect();
        let [only] = visible.as_slice() else {
            return;
        };
        let only = *only;
        let mut unpinned = false;
        if let Some(window) = self.window_mut(only) {
            window.layout.set_weight(DEFAULT_WEIGHT);
            unpinned = !window.is_pin_mode();
        }
        if unpinned {
            self.unpinned_weight = None;
        }
    }

    pub fn set_auto_pin(&mut self, auto_pin: bool) {
        self.settings.auto_pin = auto_pin;
        for window in &mut self.windows {
            window.set_auto_pin(auto_pin);
        }
    }

    pub fn set_synchronised(&mut self, id: WindowId, value: bool) -> bool {
        let changed = self
            .window_mut(id)
            .is_some_and(|w| w.set_synchronised(value));
        if changed {
            self.events.publish(WindowEvent::WindowChanged { window_id: id });
        }
        changed
    }

    pub fn set_pin_mode(&mut self, id: WindowId, value: bool) -> bool {
        let changed = self.window_mut(id).is_some_and(|w| w.set_pin_mode(value));
        if changed {
            self.events.publish(WindowEvent::WindowChanged { window_id: id });
        }
        changed
    }

    pub fn set_sync_group(&mut self, id: WindowId, group: i32) -> bool {
        let changed = self.window_mut(id).is_some_and(|w| w.set_sync_group(group));
        if changed {
            self.events.publish(WindowEvent::WindowChanged { window_id: id });
        }
        changed
    }

    // === Persistence ===

    fn to_entity(&self) -> WorkspaceEntity {
        WorkspaceEntity {
            id: self.workspace_id,
            name: self.name.clone(),
            settings: self.settings.clone(),
            unpinned_weight: self.unpinned_weight,
            maximized_window_id: self.maximized_window_id,
            primary_links_window_id: self.primary_links_window_id,
        }
    }

    /// Capture the workspace row, window rows and page rows for writing.
    pub fn rows_for_save(&self) -> WorkspaceRows {
        WorkspaceRows {
            store: self.store.clone(),
            workspace: self.to_entity(),
            windows: self
                .windows
                .iter()
                .enumerate()
                .map(|(order, w)| w.to_entity(order as i32))
                .collect(),
            pages: self
                .windows
                .iter()
                .map(|w| PageManagerEntity {
                    window_id: w.id(),
                    page: w.page_manager.clone(),
                })
                .collect(),
        }
    }

    /// Write the workspace while holding the collection.
    pub fn save_into_db(&self) {
        self.rows_for_save().write();
    }

    /// Replace the whole collection with the persisted state of `workspace_id`.
    pub fn load_from_db(&mut self, workspace_id: WorkspaceId) {
        self.release_views();
        self.windows.clear();
        self.workspace_id = workspace_id;
        self.name.clear();
        self.settings = WorkspaceSettings::default();
        self.maximized_window_id = None;
        self.primary_links_window_id = None;
        self.unpinned_weight = None;
        self.last_sync_window_id = None;

        match self.store.workspace(workspace_id) {
            Ok(Some(entity)) => {
                self.name = entity.name;
                self.settings = entity.settings;
                self.unpinned_weight = entity.unpinned_weight.filter(|w| is_valid_weight(*w));
                self.maximized_window_id = entity.maximized_window_id;
                self.primary_links_window_id = entity.primary_links_window_id;
            }
            Ok(None) => log::info!("Workspace {} not stored yet, starting empty", workspace_id),
            Err(e) => log::error!("Failed to load workspace {}: {}", workspace_id, e),
        }

        let rows = self.store.windows(workspace_id).unwrap_or_else(|e| {
            log::error!("Failed to load windows of workspace {}: {}", workspace_id, e);
            Vec::new()
        });
        for row in rows {
            let page = match self.store.page_manager(row.id) {
                Ok(page) => page.map(|p| p.page).unwrap_or_default(),
                Err(e) => {
                    log::warn!("Failed to load page of window {}: {}", row.id, e);
                    PageManager::new()
                }
            };
            let window = Window::from_entity(&row, page, self.settings.auto_pin);
            if window.is_closed() {
                log::warn!("Skipping closed {} found in storage", window);
                continue;
            }
            self.windows.push(window);
        }

        self.repair_references();
        if self.windows.is_empty() {
            self.windows.push(Window::new(
                workspace_id,
                PageManager::new(),
                self.settings.auto_pin,
            ));
        }
        if let Some(first) = self.windows.first() {
            self.active_window_id = first.id();
        }
        self.set_default_active_window();
        log::info!(
            "Loaded workspace {} with {} windows",
            workspace_id,
            self.windows.len()
        );
    }

    fn repair_references(&mut self) {
        let ids: HashSet<WindowId> = self.windows.iter().map(|w| w.id()).collect();
        self.maximized_window_id = self.maximized_window_id.filter(|id| ids.contains(id));
        self.primary_links_window_id = self.primary_links_window_id.filter(|id| ids.contains(id));
        for window in &mut self.windows {
            if window
                .target_links_window_id
                .is_some_and(|target| !ids.contains(&target))
            {
                window.target_links_window_id = None;
            }
        }
    }

    fn release_views(&self) {
        for window in &self.windows {
            self.views.destroy(window.id());
        }
    }

    /// Release every live view. The collection stays intact.
    pub fn unload(&mut self) {
        self.release_views();
        log::info!("Unloaded workspace {}", self.workspace_id);
    }
}
