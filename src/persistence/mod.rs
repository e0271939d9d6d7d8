mod entities;
mod json_store;
mod memory_store;

pub use entities::{PageManagerEntity, WindowEntity, WorkspaceEntity, WorkspaceSettings};
pub use json_store::JsonStore;
pub use memory_store::MemoryStore;

use anyhow::Result;
use lectern_core::{WindowId, WorkspaceId};
use std::path::PathBuf;

/// Get the config directory path
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lectern")
}

/// Get the directory holding one file per workspace
pub fn get_workspaces_dir() -> PathBuf {
    get_config_dir().join("workspaces")
}

/// Row-store contract the window repository persists through.
pub trait WorkspaceStore: Send + Sync {
    fn workspace(&self, id: WorkspaceId) -> Result<Option<WorkspaceEntity>>;

    /// Window rows of a workspace, sorted by `order_number`.
    fn windows(&self, workspace_id: WorkspaceId) -> Result<Vec<WindowEntity>>;

    fn page_manager(&self, window_id: WindowId) -> Result<Option<PageManagerEntity>>;

    fn save_workspace(&self, workspace: &WorkspaceEntity) -> Result<()>;

    /// Replace every window and page row of the workspace.
    fn save_windows(
        &self,
        workspace_id: WorkspaceId,
        windows: &[WindowEntity],
        pages: &[PageManagerEntity],
    ) -> Result<()>;

    fn delete_window(&self, window_id: WindowId) -> Result<()>;

    fn workspaces(&self) -> Result<Vec<WorkspaceId>>;
}
