use super::{PageManagerEntity, WindowEntity, WorkspaceEntity, WorkspaceStore};
use anyhow::{Context, Result};
use lectern_core::{WindowId, WorkspaceId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk contents of one workspace file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkspaceFile {
    #[serde(default)]
    workspace: Option<WorkspaceEntity>,
    #[serde(default)]
    windows: Vec<WindowEntity>,
    #[serde(default)]
    pages: Vec<PageManagerEntity>,
}

/// Store writing one pretty-printed JSON file per workspace.
pub struct JsonStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on the files.
    io: Mutex<()>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            io: Mutex::new(()),
        }
    }

    /// Store under `<config_dir>/lectern/workspaces`.
    pub fn open_default() -> Self {
        Self::new(super::get_workspaces_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: WorkspaceId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn read(&self, id: WorkspaceId) -> Result<WorkspaceFile> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(WorkspaceFile::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(file)
    }

    fn write(&self, id: WorkspaceId, file: &WorkspaceFile) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(file)?;
        std::fs::write(self.path_for(id), content)?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<WorkspaceId>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).and_then(WorkspaceId::parse) {
                Some(id) => ids.push(id),
                None => log::warn!("Ignoring unexpected file {}", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Workspace file holding the given window row.
    fn owner_of(&self, window_id: WindowId) -> Result<Option<(WorkspaceId, WorkspaceFile)>> {
        for id in self.ids()? {
            let file = self.read(id)?;
            if file.windows.iter().any(|w| w.id == window_id)
                || file.pages.iter().any(|p| p.window_id == window_id)
            {
                return Ok(Some((id, file)));
            }
        }
        Ok(None)
    }
}

impl WorkspaceStore for JsonStore {
    fn workspace(&self, id: WorkspaceId) -> Result<Option<WorkspaceEntity>> {
        let _io = self.io.lock();
        Ok(self.read(id)?.workspace)
    }

    fn windows(&self, workspace_id: WorkspaceId) -> Result<Vec<WindowEntity>> {
        let _io = self.io.lock();
        let mut rows = self.read(workspace_id)?.windows;
        rows.sort_by_key(|w| w.order_number);
        Ok(rows)
    }

    fn page_manager(&self, window_id: WindowId) -> Result<Option<PageManagerEntity>> {
        let _io = self.io.lock();
        Ok(self
            .owner_of(window_id)?
            .and_then(|(_, file)| file.pages.into_iter().find(|p| p.window_id == window_id)))
    }

    fn save_workspace(&self, workspace: &WorkspaceEntity) -> Result<()> {
        let _io = self.io.lock();
        let mut file = self.read(workspace.id)?;
        file.workspace = Some(workspace.clone());
        self.write(workspace.id, &file)
    }

    fn save_windows(
        &self,
        workspace_id: WorkspaceId,
        windows: &[WindowEntity],
        pages: &[PageManagerEntity],
    ) -> Result<()> {
        let _io = self.io.lock();
        let mut file = self.read(workspace_id)?;
        file.windows = windows.to_vec();
        file.pages = pages.to_vec();
        self.write(workspace_id, &file)
    }

    fn delete_window(&self, window_id: WindowId) -> Result<()> {
        let _io = self.io.lock();
        if let Some((id, mut file)) = self.owner_of(window_id)? {
            file.windows.retain(|w| w.id != window_id);
            file.pages.retain(|p| p.window_id != window_id);
            self.write(id, &file)?;
        }
        Ok(())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceId>> {
        let _io = self.io.lock();
        self.ids()
    }
}
