use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::model::settings::Settings;

const APP_DIR: &str = "file-name-translator";
const SETTINGS_FILE: &str = "settings.json";

pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}

/// Loads settings from `path`. A missing or unreadable file yields defaults.
///
/// The returned settings hold only what was on disk; see
/// [`Settings::effective_api_key`] for the environment fallback.
pub fn load(path: &Path) -> Settings {
    let settings = if path.exists() {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<Settings>(&data) {
                Ok(s) => s,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read settings, using defaults");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    };

    settings.normalized()
}

pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => SETTINGS_FILE.to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::settings::Language;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_keeps_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/settings.json");

        let s = Settings {
            api_key: "key-123".into(),
            last_directory: "/photos".into(),
            chunk_size: 25,
            excluded_extensions: "jpg,png".into(),
            language: Language::Japanese,
            translate_folders: true,
            ..Settings::default()
        };

        save(&path, &s).unwrap();
        assert!(!tmp_path(&path).exists());
        assert_eq!(load(&path), s);
    }

    #[test]
    fn blank_key_round_trips_as_blank() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{ "api_key": "", "chunk_size": 5 }"#).unwrap();

        let loaded = load(&path);
        assert!(loaded.api_key.is_empty());
        save(&path, &loaded).unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["api_key"], "");
        assert_eq!(on_disk["chunk_size"], 5);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let s = load(&path);
        assert_eq!(s.chunk_size, 10);
        assert_eq!(s.model_name, "gemini-2.0-flash");
    }
}
