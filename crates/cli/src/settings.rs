use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use blurwal_core::frames::infrastructure::renderer_factory::RendererKind;
use blurwal_core::shared::constants::{
    APP_DIR_NAME, DEFAULT_MAX_STRENGTH, DEFAULT_STEPS, DEFAULT_WINDOW_THRESHOLD,
};

/// Defaults read from the settings file. Keys mirror the long CLI flags
/// and every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub min: usize,
    pub steps: u32,
    pub blur: f64,
    pub ignore: Vec<String>,
    pub renderer: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min: DEFAULT_WINDOW_THRESHOLD,
            steps: DEFAULT_STEPS,
            blur: DEFAULT_MAX_STRENGTH,
            ignore: Vec::new(),
            renderer: RendererKind::Builtin.to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Settings from `explicit` if given, else from the default location.
    ///
    /// An explicitly named file must exist and parse. A missing default
    /// file silently yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read settings {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("Invalid settings {}: {e}", path.display()))
    }

    pub fn renderer_kind(&self) -> Result<RendererKind, String> {
        self.renderer.parse()
    }
}
