//! `formcraft.toml` configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preview::upload::{DEFAULT_FOLDER, DEFAULT_TAG};

pub const CONFIG_ENV: &str = "FORMCRAFT_CONFIG";
pub const BACKEND_URL_ENV: &str = "FORMCRAFT_BACKEND_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
    #[error("no configuration directory is available on this system")]
    NoConfigDir,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormcraftConfig {
    pub backend: BackendConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/v1/organization/forms".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub folder: String,
    pub use_unique_file_name: bool,
    pub tags: Vec<String>,
    pub optimize_images: bool,
    /// Where the directory uploader stores files.
    pub output_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            use_unique_file_name: true,
            tags: vec![DEFAULT_TAG.to_string()],
            optimize_images: true,
            output_dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl FormcraftConfig {
    /// Resolves the config path (`explicit`, then `FORMCRAFT_CONFIG`, then the
    /// platform config dir), loads it, and applies environment overrides. A
    /// missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(|| default_path().ok()),
        };
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        if let Ok(url) = env::var(BACKEND_URL_ENV)
            && !url.trim().is_empty()
        {
            config.backend.base_url = url;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)
    }
}

/// `<config dir>/formcraft/config.toml`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("dev", "formcraft", "formcraft")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let config: FormcraftConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://forms.example.com/api/v1/organization/forms"

            [upload]
            tags = ["inspection"]
            "#,
        )
        .expect("parse");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.upload.folder, "form-uploads");
        assert_eq!(config.upload.tags, vec!["inspection".to_string()]);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn save_then_load_from_disk() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("nested/config.toml");
        let mut config = FormcraftConfig::default();
        config.upload.optimize_images = false;
        config.save(&path).expect("save");
        assert_eq!(FormcraftConfig::load_from(&path).expect("load"), config);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "backend = 3").expect("write");
        let err = FormcraftConfig::load_from(&path).expect_err("invalid");
        assert!(err.to_string().contains("config.toml"));
    }
}
