// Configuration loaded from config.yaml

use crate::kv::validate_key;
use crate::store::DEFAULT_TASKS_KEY;
use crate::theme::DEFAULT_THEME_KEY;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";
const CONFIG_FILENAME: &str = "config.yaml";

/// Which key-value backend holds the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,

    #[serde(default = "default_theme_key")]
    pub theme_key: String,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_tasks_key() -> String {
    DEFAULT_TASKS_KEY.to_string()
}

fn default_theme_key() -> String {
    DEFAULT_THEME_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            tasks_key: default_tasks_key(),
            theme_key: default_theme_key(),
        }
    }
}

impl Config {
    /// Default location: `<config_dir>/todostore/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
    }

    /// Load config from `path`, or return defaults if the file is missing
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Check that both storage keys are usable by every backend
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.tasks_key).context("Invalid tasks_key")?;
        validate_key(&self.theme_key).context("Invalid theme_key")?;
        Ok(())
    }

    /// Load from the default location, if the platform has one
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Path of the SQLite database when that backend is selected
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("todostore.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tasks_key, "todos");
        assert_eq!(config.theme_key, "theme");
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: sqlite\ndata_dir: /tmp/todos\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/todos"));
        assert_eq!(config.tasks_key, "todos");
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/todos/todostore.db"));
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: [not, a, backend]\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        fs::write(&path, "tasks_key: my todos\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("tasks_key"));

        fs::write(&path, "theme_key: \"../theme\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("theme_key"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config {
            data_dir: PathBuf::from("data"),
            backend: Backend::File,
            tasks_key: "work".to_string(),
            theme_key: "work-theme".to_string(),
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
