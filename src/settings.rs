use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};
use crate::loader::TRANSACTIONS_FILE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,
    #[serde(default = "default_top_clients")]
    pub top_clients: usize,
    #[serde(default = "default_top_clients_compact")]
    pub top_clients_compact: usize,
}

fn default_transactions_file() -> String {
    TRANSACTIONS_FILE.to_string()
}

fn default_top_clients() -> usize {
    15
}

fn default_top_clients_compact() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            transactions_file: default_transactions_file(),
            top_clients: default_top_clients(),
            top_clients_compact: default_top_clients_compact(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("salesboard")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("salesboard.log")
}

pub fn load_settings() -> Settings {
    read_settings(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    write_settings(&settings_path(), settings)
}

/// Settings stored at `path`. A missing or unreadable file yields defaults.
fn read_settings(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
        Settings::default()
    })
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SalesError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Data directory to read from: the command-line override, else settings.
pub fn resolve_data_dir(override_dir: Option<&str>, settings: &Settings) -> PathBuf {
    match override_dir {
        Some(dir) => PathBuf::from(shellexpand_path(dir)),
        None => PathBuf::from(shellexpand_path(&settings.data_dir)),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("salesboard").join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/sales".to_string(),
            transactions_file: "vendas.csv".to_string(),
            top_clients: 20,
            top_clients_compact: 5,
        };
        write_settings(&path, &settings).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
        let loaded = read_settings(&path);
        assert_eq!(loaded.data_dir, "/tmp/sales");
        assert_eq!(loaded.transactions_file, "vendas.csv");
        assert_eq!(loaded.top_clients, 20);
        assert_eq!(loaded.top_clients_compact, 5);
    }

    #[test]
    fn test_read_settings_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_settings(&dir.path().join("absent.json"));
        assert_eq!(missing.data_dir, ".");

        let garbled = dir.path().join("settings.json");
        std::fs::write(&garbled, "{not json").unwrap();
        let loaded = read_settings(&garbled);
        assert_eq!(loaded.top_clients, 15);
        assert_eq!(loaded.transactions_file, TRANSACTIONS_FILE);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.transactions_file, TRANSACTIONS_FILE);
        assert_eq!(s.top_clients, 15);
        assert_eq!(s.top_clients_compact, 10);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/sales"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/sales");
        assert_eq!(s.transactions_file, TRANSACTIONS_FILE);
        assert_eq!(s.top_clients, 15);
    }

    #[test]
    fn test_resolve_data_dir_prefers_override() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: "/does/not/exist".to_string(),
            ..Settings::default()
        };
        let resolved = resolve_data_dir(Some(dir.path().to_str().unwrap()), &settings);
        assert_eq!(resolved, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(
            resolve_data_dir(None, &settings),
            PathBuf::from("/does/not/exist")
        );
    }
}
