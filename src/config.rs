use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to resolve home directory for global config path")]
    HomeDirectoryUnavailable,
}

pub const GLOBAL_STATE_DIR: &str = ".vglaunch";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";

const DEFAULT_PORTAL_BASE: &str = "https://vgl.auscope.org";

/// The compute provider is currently pinned to a single service pair; the
/// backend still expects both ids on every job record.
pub const DEFAULT_COMPUTE_SERVICE_ID: &str = "aws-ec2-compute";
pub const DEFAULT_STORAGE_SERVICE_ID: &str = "amazon-aws-storage-sydney";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_portal_base")]
    pub portal_base_url: String,
    #[serde(default = "default_compute_service_id")]
    pub compute_service_id: String,
    #[serde(default = "default_storage_service_id")]
    pub storage_service_id: String,
}

fn default_portal_base() -> String {
    DEFAULT_PORTAL_BASE.to_string()
}

fn default_compute_service_id() -> String {
    DEFAULT_COMPUTE_SERVICE_ID.to_string()
}

fn default_storage_service_id() -> String {
    DEFAULT_STORAGE_SERVICE_ID.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            portal_base_url: default_portal_base(),
            compute_service_id: default_compute_service_id(),
            storage_service_id: default_storage_service_id(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(GLOBAL_STATE_DIR)
        .join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_state_root_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let settings =
            Settings::from_path(&temp.path().join("config.yaml")).expect("load settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.compute_service_id, DEFAULT_COMPUTE_SERVICE_ID);
        assert_eq!(settings.storage_service_id, DEFAULT_STORAGE_SERVICE_ID);
    }

    #[test]
    fn settings_file_overrides_portal_base_only() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("config.yaml");
        fs::write(&path, "portal_base_url: http://127.0.0.1:9999\n").expect("write settings");
        let settings = Settings::from_path(&path).expect("load settings");
        assert_eq!(settings.portal_base_url, "http://127.0.0.1:9999");
        assert_eq!(settings.compute_service_id, DEFAULT_COMPUTE_SERVICE_ID);
    }

    #[test]
    fn unknown_settings_keys_are_rejected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("config.yaml");
        fs::write(&path, "portal_base: http://example.org\n").expect("write settings");
        assert!(matches!(
            Settings::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
