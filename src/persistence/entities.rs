//! Persisted record shapes. Field names are the column names of the row store.

use crate::window::layout::WindowLayoutEntity;
use crate::window::page::PageManager;
use lectern_core::{WindowId, WorkspaceId};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Settings that belong to one workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// Treat every pane as pinned.
    #[serde(default = "default_true")]
    pub auto_pin: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self { auto_pin: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceEntity {
    pub id: WorkspaceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    #[serde(default)]
    pub unpinned_weight: Option<f32>,
    #[serde(default)]
    pub maximized_window_id: Option<WindowId>,
    #[serde(default)]
    pub primary_links_window_id: Option<WindowId>,
}

impl WorkspaceEntity {
    pub fn new(id: WorkspaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            settings: WorkspaceSettings::default(),
            unpinned_weight: None,
            maximized_window_id: None,
            primary_links_window_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowEntity {
    pub id: WindowId,
    pub workspace_id: WorkspaceId,
    #[serde(default = "default_true")]
    pub is_synchronised: bool,
    #[serde(default)]
    pub is_pin_mode: bool,
    pub layout: WindowLayoutEntity,
    #[serde(default)]
    pub target_links_window_id: Option<WindowId>,
    #[serde(default)]
    pub is_links_window: bool,
    #[serde(default)]
    pub sync_group: i32,
    #[serde(default)]
    pub order_number: i32,
}

/// Content-state row of one pane. The page is opaque to the pane core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageManagerEntity {
    pub window_id: WindowId,
    #[serde(default)]
    pub page: PageManager,
}
