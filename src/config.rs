//! User settings, persisted as JSON in the OS config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const APP_NAME: &str = "GanttTimeline";

/// Every field has a default so a partial file is still valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the task store lives. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub min_col_width: f32,
    pub min_canvas_height: f32,
    /// Containers at most this wide use the compact metrics.
    pub narrow_breakpoint: f32,
    pub regular_row_height: f32,
    pub compact_row_height: f32,
    pub regular_padding: f32,
    pub compact_padding: f32,
    pub resize_debounce_ms: u64,
    pub click_debounce_ms: u64,
    pub toolbar_debounce_ms: u64,
    pub notification_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            min_col_width: 80.0,
            min_canvas_height: 300.0,
            narrow_breakpoint: 767.0,
            regular_row_height: 55.0,
            compact_row_height: 40.0,
            regular_padding: 25.0,
            compact_padding: 10.0,
            resize_debounce_ms: 200,
            click_debounce_ms: 100,
            toolbar_debounce_ms: 50,
            notification_ms: 3000,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, writing defaults on first run.
    pub fn load() -> Self {
        let path = Self::settings_path();
        let settings = Self::load_from(&path);
        if !path.exists() {
            settings.save_to(&path);
        }
        settings
    }

    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "invalid settings file, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "could not serialize settings");
                return;
            }
        };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(err) = std::fs::write(path, json) {
            warn!(path = %path.display(), error = %err, "could not write settings");
        }
    }

    pub fn settings_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => PathBuf::from("settings.json"),
        }
    }

    /// Directory for the task store.
    pub fn store_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => PathBuf::from("data"),
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }

    pub fn toolbar_debounce(&self) -> Duration {
        Duration::from_millis(self.toolbar_debounce_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "min_col_width": 64.0 }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.min_col_width, 64.0);
        assert_eq!(settings.regular_row_height, 55.0);
    }

    #[test]
    fn broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            data_dir: Some(dir.path().join("store")),
            ..Settings::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }
}
