//! Application settings file
//!
//! Settings live in `<config_dir>/lectern/settings.json`. Every field has a
//! serde default so partial and older files still load.

use crate::persistence::get_config_dir;
use crate::window::loader::LoaderConfig;
use crate::window::sync::SyncConfig;
use anyhow::Result;
use lectern_core::WorkspaceId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current settings schema version
pub const SETTINGS_VERSION: u32 = 1;

fn default_settings_version() -> u32 {
    SETTINGS_VERSION
}

fn default_sync_debounce_ms() -> u64 {
    200
}

fn default_content_wait_timeout_ms() -> u64 {
    5000
}

fn default_content_poll_interval_ms() -> u64 {
    50
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Settings schema version for migration support
    #[serde(default = "default_settings_version")]
    pub version: u32,
    #[serde(default)]
    pub night_mode: bool,
    /// Quiet period before a burst of sync requests runs as one pass
    #[serde(default = "default_sync_debounce_ms")]
    pub sync_debounce_ms: u64,
    /// How long a load waits for its view to attach
    #[serde(default = "default_content_wait_timeout_ms")]
    pub content_wait_timeout_ms: u64,
    #[serde(default = "default_content_poll_interval_ms")]
    pub content_poll_interval_ms: u64,
    /// Workspace opened on start (None = create a new one)
    #[serde(default)]
    pub active_workspace: Option<WorkspaceId>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            night_mode: false,
            sync_debounce_ms: default_sync_debounce_ms(),
            content_wait_timeout_ms: default_content_wait_timeout_ms(),
            content_poll_interval_ms: default_content_poll_interval_ms(),
            active_workspace: None,
        }
    }
}

impl AppSettings {
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(self.sync_debounce_ms.clamp(10, 5_000)),
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            wait_timeout: Duration::from_millis(self.content_wait_timeout_ms.clamp(100, 60_000)),
            poll_interval: Duration::from_millis(self.content_poll_interval_ms.clamp(5, 1_000)),
        }
    }
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}

/// Load app settings, falling back to defaults on any problem
pub fn load_settings() -> AppSettings {
    load_settings_from(&get_settings_path())
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        log::info!("Settings file not found at {}, using defaults", path.display());
        return AppSettings::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::error!("Failed to read settings file {}: {}", path.display(), e);
            return AppSettings::default();
        }
    };

    match serde_json::from_str::<AppSettings>(&content) {
        Ok(settings) => return migrate_settings(settings, path),
        Err(e) => {
            log::warn!("Failed to parse settings directly: {}, attempting partial recovery", e);
        }
    }

    match recover_settings_from_json(&content) {
        Ok(settings) => {
            log::info!("Recovered settings with partial data");
            let settings = migrate_settings(settings, path);
            if let Err(e) = save_settings_to(&settings, path) {
                log::warn!("Failed to save recovered settings: {}", e);
            }
            settings
        }
        Err(e) => {
            log::error!("Failed to recover settings from {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

/// Pick out the fields that still parse and default the rest
fn recover_settings_from_json(content: &str) -> Result<AppSettings> {
    use anyhow::Context;

    let value: serde_json::Value =
        serde_json::from_str(content).context("Settings file is not valid JSON")?;
    let obj = value
        .as_object()
        .context("Settings file root is not a JSON object")?;

    let mut settings = AppSettings::default();
    if let Some(v) = obj.get("version").and_then(|v| v.as_u64()) {
        settings.version = v as u32;
    }
    if let Some(v) = obj.get("night_mode").and_then(|v| v.as_bool()) {
        settings.night_mode = v;
    }
    if let Some(v) = obj.get("sync_debounce_ms").and_then(|v| v.as_u64()) {
        settings.sync_debounce_ms = v;
    }
    if let Some(v) = obj.get("content_wait_timeout_ms").and_then(|v| v.as_u64()) {
        settings.content_wait_timeout_ms = v;
    }
    if let Some(v) = obj.get("content_poll_interval_ms").and_then(|v| v.as_u64()) {
        settings.content_poll_interval_ms = v;
    }
    if let Some(v) = obj.get("active_workspace") {
        match serde_json::from_value::<Option<WorkspaceId>>(v.clone()) {
            Ok(id) => settings.active_workspace = id,
            Err(_) => log::warn!("Could not parse active_workspace, using default"),
        }
    }
    Ok(settings)
}

fn migrate_settings(mut settings: AppSettings, path: &Path) -> AppSettings {
    let original_version = settings.version;
    if settings.version == 0 {
        log::info!("Migrating settings from pre-versioning (v0) to v1");
        settings.version = 1;
    }
    if settings.version < SETTINGS_VERSION {
        settings.version = SETTINGS_VERSION;
    }
    if original_version != settings.version {
        log::info!("Settings migrated from v{} to v{}", original_version, settings.version);
        if let Err(e) = save_settings_to(&settings, path) {
            log::warn!("Failed to save migrated settings: {}", e);
        }
    }
    settings
}

pub fn save_settings(settings: &AppSettings) -> Result<()> {
    save_settings_to(settings, &get_settings_path())
}

pub fn save_settings_to(settings: &AppSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.sync_config().debounce, Duration::from_millis(200));
        let loader = settings.loader_config();
        assert_eq!(loader.wait_timeout, Duration::from_secs(5));
        assert_eq!(loader.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            night_mode: true,
            active_workspace: Some(WorkspaceId::new()),
            ..AppSettings::default()
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn partial_file_keeps_good_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"night_mode": true, "sync_debounce_ms": "fast", "active_workspace": 7}"#,
        )
        .unwrap();
        let settings = load_settings_from(&path);
        assert!(settings.night_mode);
        assert_eq!(settings.sync_debounce_ms, 200);
        assert_eq!(settings.active_workspace, None);
    }

    #[test]
    fn version_zero_is_migrated_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"version": 0}"#).unwrap();
        assert_eq!(load_settings_from(&path).version, SETTINGS_VERSION);
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("\"version\": 1"));
    }

    #[test]
    fn out_of_range_timings_are_clamped() {
        let settings = AppSettings {
            sync_debounce_ms: 0,
            content_poll_interval_ms: 1_000_000,
            ..AppSettings::default()
        };
        assert_eq!(settings.sync_config().debounce, Duration::from_millis(10));
        assert_eq!(settings.loader_config().poll_interval, Duration::from_secs(1));
    }
}
