use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::themes::ThemeName;

/// Persisted dashboard preferences, stored as JSON under the user config
/// directory (`pulseboard/settings.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: String,
    pub preset_days: u32,
    pub compare: bool,
    /// Empty means "all roster accounts".
    pub enabled_accounts: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "blue".to_string(),
            preset_days: 30,
            compare: true,
            enabled_accounts: Vec::new(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pulseboard").join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults when the file
    /// is missing or unreadable. The path is injected so tests never touch
    /// the user's real config directory.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn theme_name(&self) -> ThemeName {
        ThemeName::parse(&self.theme).unwrap_or_default()
    }

    pub fn set_theme(&mut self, name: ThemeName) {
        self.theme = name.as_str().to_string();
    }
}
