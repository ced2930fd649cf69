//! Configuration model and read-only settings IO.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::animation::DEFAULT_INTERVAL_MS;
use crate::frames::CanvasSize;

/// File name used under the per-user config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Visual theme of the window itself.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    /// Also used for unrecognised values.
    #[default]
    #[serde(other)]
    Dark,
}

/// Settings read from `settings.json`; every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Directory holding the `pack_*` directories.
    pub themes_root: Option<PathBuf>,
    /// Name prefix identifying pack directories.
    pub pack_prefix: String,
    /// Where Plymouth looks for installed themes.
    pub system_theme_dir: PathBuf,
    /// Privilege escalation launcher wrapping each privileged step.
    pub privilege_launcher: String,
    /// Command that sets the default theme.
    pub set_default_command: String,
    /// Live preview helper; defaults to `showplymouth.sh` in the themes root.
    pub preview_script: Option<PathBuf>,
    /// Duration argument passed to the preview helper.
    pub preview_seconds: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Initial frame interval in milliseconds.
    pub frame_interval_ms: u64,
    /// Window visuals.
    pub theme: ThemeMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            themes_root: None,
            pack_prefix: "pack_".into(),
            system_theme_dir: PathBuf::from("/usr/share/plymouth/themes"),
            privilege_launcher: "pkexec".into(),
            set_default_command: "plymouth-set-default-theme".into(),
            preview_script: None,
            preview_seconds: 10,
            canvas_width: 640,
            canvas_height: 400,
            frame_interval_ms: DEFAULT_INTERVAL_MS,
            theme: ThemeMode::default(),
        }
    }
}

impl AppSettings {
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.canvas_width.max(1),
            height: self.canvas_height.max(1),
        }
    }

    /// Themes root from settings, else the current directory.
    pub fn resolve_themes_root(&self) -> Result<PathBuf> {
        match &self.themes_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().context("cannot determine current directory"),
        }
    }
}

/// Resolve the per-user settings file path.
pub fn settings_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("dev", "plymouth_toolkit", "plymouth_toolkit")
        .ok_or_else(|| anyhow!("cannot determine config directory"))?;
    Ok(proj_dirs.config_dir().join(SETTINGS_FILE))
}

/// Load settings from the default location, returning defaults when missing.
pub fn load() -> AppSettings {
    match settings_path() {
        Ok(path) => load_from(&path),
        Err(err) => {
            log::debug!("using default settings: {err}");
            AppSettings::default()
        }
    }
}

/// Load settings from `path`; a missing or malformed file yields defaults.
pub fn load_from(path: &Path) -> AppSettings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return AppSettings::default(),
    };
    match serde_json::from_str(&contents) {
        Ok(settings) => {
            log::info!("loaded settings from {}", path.display());
            settings
        }
        Err(err) => {
            log::warn!("ignoring malformed {}: {err}", path.display());
            AppSettings::default()
        }
    }
}
