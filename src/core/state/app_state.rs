use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::assets::RESOURCES_URL;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::is_contained;

const APP_DIR_NAME: &str = "launcher-meta";
const SETTINGS_FILE: &str = "launcher_settings.json";
const VERSION_MANIFEST_FILE: &str = "version_manifest_v2.json";

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherSettings {
    pub version_manifest_url: String,
    pub resources_url: String,
    /// How long the version manifest index stays fresh on disk.
    pub manifest_max_age_hours: u32,
    /// Check SHA-1 of cached documents before using them.
    pub verify_integrity: bool,
    pub bundled_runtimes: Vec<String>,
    pub fetch_retries: u32,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            version_manifest_url: VERSION_MANIFEST_URL.to_string(),
            resources_url: RESOURCES_URL.to_string(),
            manifest_max_age_hours: 24,
            verify_integrity: true,
            bundled_runtimes: vec![
                "Internal-8".to_string(),
                "Internal-17".to_string(),
                "Internal-21".to_string(),
            ],
            fetch_retries: 3,
        }
    }
}

impl LauncherSettings {
    pub fn manifest_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.manifest_max_age_hours))
    }
}

/// Data directory plus the settings stored in it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub launcher_settings: LauncherSettings,
}

impl AppState {
    /// Open `data_dir`, reading its settings file if present.
    ///
    /// A missing file yields defaults; an unreadable one is reported.
    pub fn load(data_dir: impl Into<PathBuf>) -> LauncherResult<Self> {
        let data_dir = data_dir.into();
        let launcher_settings = load_settings_from_disk(&data_dir)?.unwrap_or_default();
        Ok(Self {
            data_dir,
            launcher_settings,
        })
    }

    pub fn runtimes_dir(&self) -> PathBuf {
        self.data_dir.join("runtimes")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    pub fn version_manifest_path(&self) -> PathBuf {
        self.data_dir.join(VERSION_MANIFEST_FILE)
    }

    /// `versions/<id>/<id>.json`
    pub fn game_manifest_path(&self, version_id: &str) -> LauncherResult<PathBuf> {
        let id = contained_id(version_id)?;
        Ok(self.versions_dir().join(id).join(format!("{id}.json")))
    }

    /// `assets/indexes/<id>.json`
    pub fn asset_index_path(&self, index_id: &str) -> LauncherResult<PathBuf> {
        let id = contained_id(index_id)?;
        Ok(self.assets_dir().join("indexes").join(format!("{id}.json")))
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| LauncherError::io(&self.data_dir, e))?;
        let settings_path = self.data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(&self.launcher_settings)?;
        std::fs::write(&settings_path, json).map_err(|e| LauncherError::io(&settings_path, e))
    }
}

/// Ids come from remote documents and become path components.
fn contained_id(id: &str) -> LauncherResult<&str> {
    if is_contained(id) {
        Ok(id)
    } else {
        Err(LauncherError::UnsafePath(id.to_string()))
    }
}

fn load_settings_from_disk(data_dir: &Path) -> LauncherResult<Option<LauncherSettings>> {
    let path = data_dir.join(SETTINGS_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings at {:?}, using defaults", path);
            return Ok(None);
        }
        Err(e) => return Err(LauncherError::io(&path, e)),
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => Ok(Some(settings)),
        Err(e) => {
            warn!("Ignoring malformed settings file {:?}: {}", path, e);
            Ok(None)
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
