use super::{PageManagerEntity, WindowEntity, WorkspaceEntity, WorkspaceStore};
use anyhow::Result;
use lectern_core::{WindowId, WorkspaceId};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    workspaces: HashMap<WorkspaceId, WorkspaceEntity>,
    windows: HashMap<WindowId, WindowEntity>,
    pages: HashMap<WindowId, PageManagerEntity>,
}

/// Store kept entirely in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkspaceStore for MemoryStore {
    fn workspace(&self, id: WorkspaceId) -> Result<Option<WorkspaceEntity>> {
        Ok(self.tables.lock().workspaces.get(&id).cloned())
    }

    fn windows(&self, workspace_id: WorkspaceId) -> Result<Vec<WindowEntity>> {
        let tables = self.tables.lock();
        let mut rows: Vec<WindowEntity> = tables
            .windows
            .values()
            .filter(|w| w.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.order_number);
        Ok(rows)
    }

    fn page_manager(&self, window_id: WindowId) -> Result<Option<PageManagerEntity>> {
        Ok(self.tables.lock().pages.get(&window_id).cloned())
    }

    fn save_workspace(&self, workspace: &WorkspaceEntity) -> Result<()> {
        self.tables
            .lock()
            .workspaces
            .insert(workspace.id, workspace.clone());
        Ok(())
    }

    fn save_windows(
        &self,
        workspace_id: WorkspaceId,
        windows: &[WindowEntity],
        pages: &[PageManagerEntity],
    ) -> Result<()> {
        let mut tables = self.tables.lock();
        let stale: Vec<WindowId> = tables
            .windows
            .values()
            .filter(|w| w.workspace_id == workspace_id)
            .map(|w| w.id)
            .collect();
        for id in stale {
            tables.windows.remove(&id);
            tables.pages.remove(&id);
        }
        for window in windows {
            tables.windows.insert(window.id, window.clone());
        }
        for page in pages {
            tables.pages.insert(page.window_id, page.clone());
        }
        Ok(())
    }

    fn delete_window(&self, window_id: WindowId) -> Result<()> {
        let mut tables = self.tables.lock();
        tables.windows.remove(&window_id);
        tables.pages.remove(&window_id);
        Ok(())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceId>> {
        Ok(self.tables.lock().workspaces.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::layout::WindowLayout;

    fn row(workspace_id: WorkspaceId, order_number: i32) -> WindowEntity {
        WindowEntity {
            id: WindowId::new(),
            workspace_id,
            is_synchronised: true,
            is_pin_mode: false,
            layout: WindowLayout::default().to_entity(),
            target_links_window_id: None,
            is_links_window: false,
            sync_group: 0,
            order_number,
        }
    }

    #[test]
    fn windows_come_back_in_order() {
        let store = MemoryStore::new();
        let ws = WorkspaceId::new();
        let rows = vec![row(ws, 2), row(ws, 0), row(ws, 1)];
        store.save_windows(ws, &rows, &[]).unwrap();
        let orders: Vec<i32> = store.windows(ws).unwrap().iter().map(|w| w.order_number).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn save_windows_replaces_only_that_workspace() {
        let store = MemoryStore::new();
        let a = WorkspaceId::new();
        let b = WorkspaceId::new();
        store.save_windows(a, &[row(a, 0), row(a, 1)], &[]).unwrap();
        store.save_windows(b, &[row(b, 0)], &[]).unwrap();
        store.save_windows(a, &[row(a, 0)], &[]).unwrap();
        assert_eq!(store.windows(a).unwrap().len(), 1);
        assert_eq!(store.windows(b).unwrap().len(), 1);
    }

    #[test]
    fn delete_window_drops_page_row() {
        let store = MemoryStore::new();
        let ws = WorkspaceId::new();
        let window = row(ws, 0);
        let page = PageManagerEntity {
            window_id: window.id,
            page: Default::default(),
        };
        store.save_windows(ws, &[window.clone()], &[page]).unwrap();
        assert!(store.page_manager(window.id).unwrap().is_some());
        store.delete_window(window.id).unwrap();
        assert!(store.page_manager(window.id).unwrap().is_none());
        assert!(store.windows(ws).unwrap().is_empty());
    }
}
