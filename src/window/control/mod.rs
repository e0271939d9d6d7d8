//! User-facing window operations.
//!
//! Every operation mutates the repository, releases its lock, publishes the
//! change and then asks the sync engine for whatever reloads it implies.

mod layout;
mod links;
mod sync;

use crate::window::content::ContentSource;
use crate::window::events::{EventBus, WindowEvent};
use crate::window::loader::{LoaderConfig, TextLoader};
use crate::window::repository::{SharedRepository, WindowRepository};
use crate::window::sync::{SyncConfig, WindowSync};
use lectern_core::WindowId;
use std::sync::Arc;

pub struct WindowControl {
    repo: SharedRepository,
    sync: WindowSync,
    events: EventBus,
}

impl WindowControl {
    pub fn new(
        repo: WindowRepository,
        source: Arc<dyn ContentSource>,
        sync_config: SyncConfig,
        loader_config: LoaderConfig,
    ) -> Self {
        let events = repo.events().clone();
        let repo = repo.into_shared();
        let loader = TextLoader::new(repo.clone(), source, loader_config);
        let sync = WindowSync::new(repo.clone(), loader, sync_config);
        Self { repo, sync, events }
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repo
    }

    pub fn window_sync(&self) -> &WindowSync {
        &self.sync
    }

    pub fn active_window_id(&self) -> WindowId {
        self.repo.lock().active_window_id()
    }

    pub fn set_active_window(&self, id: WindowId) {
        self.repo.lock().set_active_window(id);
        self.sync.update_text_if_needed(id);
    }

    fn layout_changed(&self) {
        self.events.publish(WindowEvent::LayoutChanged);
    }

    fn number_of_windows_changed(&self) {
        self.events.publish(WindowEvent::NumberOfWindowsChanged);
        self.events.publish(WindowEvent::LayoutChanged);
    }
}
