// Application settings
// Loaded from ~/.config/postlyzer/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

/// Feature switches. Passed explicitly to whatever needs them; there is no
/// process-wide flag table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// CSV export of tables (insights, tags, admin lists)
    pub csv_export: bool,

    /// Rollup reconciliation jobs
    pub reconciliation: bool,

    /// Latest-bucket selection over raw rollup dumps
    pub latest_selection: bool,

    /// Post-vs-account-average scoring
    pub scoring: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            csv_export: true,
            reconciliation: true,
            latest_selection: true,
            scoring: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Export
    #[serde(rename = "export.directory")]
    pub export_directory: Option<PathBuf>, // None = download dir

    // Reconciliation
    #[serde(rename = "reconcile.defaultThreshold")]
    pub default_threshold: f64,

    // Features
    #[serde(rename = "features", default)]
    pub features: FeatureFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_directory: None,
            default_threshold: 5.0,
            features: FeatureFlags::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("postlyzer");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file. Missing or invalid files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Error parsing {}: {}", path.display(), e);
                warn!("Using default settings");
                Self::default()
            }),
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Where saved CSV exports go (null = download directory)
    "export.directory": null,

    // Relative drift (percent) a rollup field must exceed to be reported
    "reconcile.defaultThreshold": 5.0,

    // Feature switches
    "features": {
        "csv_export": true,
        "reconciliation": true,
        "latest_selection": true,
        "scoring": true
    }
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            warn!("Error writing default settings.json: {}", e);
        }
    }
}
