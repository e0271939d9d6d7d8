use crate::persistence::WindowEntity;
use crate::window::layout::{WindowLayout, WindowState};
use crate::window::page::{PageManager, PageSnapshot};
use lectern_core::{Location, WindowId, WorkspaceId};
use std::fmt;
use std::time::Instant;

/// One on-screen reading surface.
///
/// Panes are owned by the [`WindowRepository`](crate::window::repository::WindowRepository);
/// everything that needs sibling panes (visibility under maximisation, links
/// resolution) lives there.
#[derive(Clone, Debug)]
pub struct Window {
    id: WindowId,
    workspace_id: WorkspaceId,
    is_links_window: bool,
    pub(crate) target_links_window_id: Option<WindowId>,
    sync_group: i32,
    is_synchronised: bool,
    pin_mode: bool,
    /// Copy of the workspace auto-pin setting, kept current by the repository.
    auto_pin: bool,
    pub layout: WindowLayout,
    pub page_manager: PageManager,
    /// What the view was last asked to show.
    displayed: Option<PageSnapshot>,
    last_content_update: Option<Instant>,
    load_requested_at: Option<Instant>,
    load_seq: u64,
}

impl Window {
    pub(crate) fn new(workspace_id: WorkspaceId, page_manager: PageManager, auto_pin: bool) -> Self {
        Self {
            id: WindowId::new(),
            workspace_id,
            is_links_window: false,
            target_links_window_id: None,
            sync_group: 0,
            is_synchronised: true,
            pin_mode: false,
            auto_pin,
            layout: WindowLayout::default(),
            page_manager,
            displayed: None,
            last_content_update: None,
            load_requested_at: None,
            load_seq: 0,
        }
    }

    pub(crate) fn new_links_window(
        workspace_id: WorkspaceId,
        page_manager: PageManager,
        auto_pin: bool,
    ) -> Self {
        let mut window = Self::new(workspace_id, page_manager, auto_pin);
        window.is_links_window = true;
        window.is_synchronised = false;
        window
    }

    pub(crate) fn from_entity(entity: &WindowEntity, page_manager: PageManager, auto_pin: bool) -> Self {
        Self {
            id: entity.id,
            workspace_id: entity.workspace_id,
            is_links_window: entity.is_links_window,
            target_links_window_id: entity.target_links_window_id,
            sync_group: entity.sync_group,
            is_synchronised: entity.is_synchronised,
            pin_mode: entity.is_pin_mode,
            auto_pin,
            layout: WindowLayout::from_entity(&entity.layout),
            page_manager,
            displayed: None,
            last_content_update: None,
            load_requested_at: None,
            load_seq: 0,
        }
    }

    pub(crate) fn to_entity(&self, order_number: i32) -> WindowEntity {
        WindowEntity {
            id: self.id,
            workspace_id: self.workspace_id,
            is_synchronised: self.is_synchronised,
            // The stored flag, not the auto-pin override.
            is_pin_mode: self.pin_mode,
            layout: self.layout.to_entity(),
            target_links_window_id: self.target_links_window_id,
            is_links_window: self.is_links_window,
            sync_group: self.sync_group,
            order_number,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    pub fn is_links_window(&self) -> bool {
        self.is_links_window
    }

    pub fn target_links_window_id(&self) -> Option<WindowId> {
        self.target_links_window_id
    }

    pub fn sync_group(&self) -> i32 {
        self.sync_group
    }

    pub fn is_synchronised(&self) -> bool {
        self.is_synchronised
    }

    /// Pinned panes stay visible when another pane is restored.
    pub fn is_pin_mode(&self) -> bool {
        self.auto_pin || self.pin_mode
    }

    /// The pin flag as stored, ignoring auto-pin.
    pub fn pin_mode_flag(&self) -> bool {
        self.pin_mode
    }

    pub fn is_closed(&self) -> bool {
        self.layout.state == WindowState::Closed
    }

    /// True if the current document can take part in synchronisation.
    pub fn is_syncable(&self) -> bool {
        self.page_manager.is_syncable()
    }

    pub(crate) fn set_synchronised(&mut self, value: bool) -> bool {
        let changed = self.is_synchronised != value;
        self.is_synchronised = value;
        changed
    }

    pub(crate) fn set_pin_mode(&mut self, value: bool) -> bool {
        let changed = self.pin_mode != value;
        self.pin_mode = value;
        changed
    }

    pub(crate) fn set_sync_group(&mut self, group: i32) -> bool {
        let changed = self.sync_group != group;
        self.sync_group = group;
        changed
    }

    pub(crate) fn set_auto_pin(&mut self, auto_pin: bool) {
        self.auto_pin = auto_pin;
    }

    pub fn displayed(&self) -> Option<&PageSnapshot> {
        self.displayed.as_ref()
    }

    pub fn last_content_update(&self) -> Option<Instant> {
        self.last_content_update
    }

    /// Content is older than the last forced resync.
    pub fn is_stale(&self, last_force_sync_all: Option<Instant>) -> bool {
        let newest = self.last_content_update.max(self.load_requested_at);
        last_force_sync_all > newest
    }

    /// The view shows something other than the cursor, or content predates a forced resync.
    pub fn needs_reload(&self, last_force_sync_all: Option<Instant>) -> bool {
        self.page_manager.snapshot() != self.displayed || self.is_stale(last_force_sync_all)
    }

    /// Record that a load of `snapshot` was dispatched. Returns its sequence number.
    pub(crate) fn begin_load(&mut self, snapshot: PageSnapshot) -> u64 {
        self.displayed = Some(snapshot);
        self.load_requested_at = Some(Instant::now());
        self.load_seq += 1;
        self.load_seq
    }

    /// Accept a finished load only if it is the latest one dispatched and the
    /// snapshot it was made for is still the one displayed.
    pub(crate) fn finish_load(&mut self, seq: u64, snapshot: &PageSnapshot) -> bool {
        if seq != self.load_seq || self.displayed.as_ref() != Some(snapshot) {
            return false;
        }
        self.last_content_update = Some(Instant::now());
        true
    }

    /// Forget a dispatched load that never reached its view, so the next
    /// trigger loads again. Ignored once a newer load was dispatched.
    pub(crate) fn abandon_load(&mut self, seq: u64) {
        if seq != self.load_seq {
            return;
        }
        self.displayed = None;
        self.load_requested_at = None;
    }

    /// The view scrolled to `location` inside content it already holds.
    pub(crate) fn mark_scrolled(&mut self, location: Location) {
        if let Some(displayed) = self.displayed.as_mut() {
            displayed.location = location;
        }
        self.last_content_update = Some(Instant::now());
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window[{}]", self.id)
    }
}
