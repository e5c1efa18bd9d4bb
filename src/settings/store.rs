//! Settings file I/O

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings as settings_config;
use crate::error::{CcError, Result};

use super::models::Settings;

/// Reads and writes the settings file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    config_path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Store at `$CF_HOME/.cf/config.json`, falling back to the home directory
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(std::env::var(settings_config::HOME_ENV_VAR).ok()),
        }
    }

    /// Store with an explicit file path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path(home_override: Option<String>) -> PathBuf {
        home_override
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(settings_config::DIR_NAME)
            .join(settings_config::FILE_NAME)
    }

    /// Load settings; a missing file yields defaults, corrupt JSON is an error
    pub fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            debug!(
                "No settings file at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            CcError::Config(format!(
                "Failed to read settings {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            CcError::Config(format!(
                "Failed to parse settings {}: {}",
                self.config_path.display(),
                e
            ))
        })
    }

    /// Write settings atomically (tmp file + rename), creating the directory
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CcError::Config(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| CcError::Config(format!("Failed to serialize settings: {}", e)))?;

        let tmp_path = self.config_path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).map_err(|e| {
            CcError::Config(format!(
                "Failed to write temp settings file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, permissions).map_err(|e| {
                CcError::Config(format!("Failed to set permissions on settings file: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.config_path).map_err(|e| {
            CcError::Config(format!(
                "Failed to rename temp settings file to {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        debug!("Saved settings to {}", self.config_path.display());
        Ok(())
    }
}
