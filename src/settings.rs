// ============================================================================
// Editor settings: persisted JSON with per-field defaults
// ============================================================================

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ops::text::FontSpec;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything tunable about the editor. Missing fields take their default,
/// so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub display_width: u32,
    pub display_height: u32,
    pub default_font: FontSpec,
    pub text_color: [u8; 4],
    pub selection_color: [u8; 4],
    pub selection_line_width: f64,
    pub handle_radius: f64,
    /// Pixels near an item's far edges treated as outside by overflow masks.
    pub mask_edge_guard: u32,
    pub export_file_name: String,
    /// Font files registered at startup, under their file stem.
    pub font_files: Vec<PathBuf>,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            display_width: 500,
            display_height: 500,
            default_font: FontSpec::default(),
            text_color: [0, 0, 0, 255],
            selection_color: [0x0d, 0x6e, 0xfd, 255],
            selection_line_width: 10.0,
            handle_radius: 15.0,
            mask_edge_guard: 1,
            export_file_name: "my-image.png".to_string(),
            font_files: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl EditorSettings {
    /// `<config dir>/ComposeFE/settings.json`.
    pub fn settings_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("ComposeFE").join("settings.json"))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `path` (or the default location). Never fails: a missing
    /// file yields defaults silently, a broken one yields defaults with a
    /// warning.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::settings_path() {
                Some(p) => p,
                None => return Self::default(),
            },
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(target_os = "windows")]
fn config_dir() -> Option<PathBuf> {
    std::env::var("APPDATA")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .ok()
}

#[cfg(target_os = "macos")]
fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
        .ok()
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok()
}
