// Application settings
// Loaded from ~/.config/tagcalc/settings.json

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use tagcalc_engine::{ControllerOptions, OperatorPolicy};

pub const DEFAULT_ENDPOINT: &str = "https://652f91320b8d8ddac0b2b62b.mockapi.io";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Suggestions
    #[serde(rename = "suggestions.endpoint")]
    pub endpoint: String,

    #[serde(rename = "suggestions.timeoutSecs")]
    pub timeout_secs: Option<u64>,  // None = wait indefinitely

    // Formula
    #[serde(rename = "formula.strictOperators")]
    pub strict_operators: bool,

    // UI
    #[serde(rename = "ui.maxDropdownRows")]
    pub max_dropdown_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            strict_operators: false,
            max_dropdown_rows: 8,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tagcalc");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, writing a commented default
    /// file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Error reading {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            operator_policy: if self.strict_operators {
                OperatorPolicy::Strict
            } else {
                OperatorPolicy::Permissive
            },
        }
    }

    /// Create default settings file with comments
    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = format!(r#"{{
    // Where the autocomplete list is fetched from ({{endpoint}}/autocomplete)
    "suggestions.endpoint": "{}",

    // Seconds to wait for the list; null waits indefinitely
    "suggestions.timeoutSecs": null,

    // Reject an operator directly after another operator
    "formula.strictOperators": false,

    // Dropdown height in rows
    "ui.maxDropdownRows": 8
}}
"#, DEFAULT_ENDPOINT);

        if let Err(e) = fs::write(path, default_config) {
            warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
