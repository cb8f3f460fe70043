//! Configuration management for studentrec.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name used under the platform config directory.
const APP_DIR_NAME: &str = "studentrec";

/// Default credential store file name.
const CREDENTIALS_FILE_NAME: &str = "credentials.txt";

/// Default student store file name.
const STUDENTS_FILE_NAME: &str = "students.txt";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `STUDENTREC_`, `__` between levels)
/// 2. TOML config file at `~/.config/studentrec/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store file locations.
    pub storage: StorageConfig,
    /// Default administrator created on first start.
    pub bootstrap: BootstrapConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding both store files.
    /// Defaults to the current working directory.
    pub data_dir: Option<PathBuf>,
    /// File name of the credential store.
    pub credentials_file: String,
    /// File name of the student store.
    pub students_file: String,
}

/// Default administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Username of the default admin.
    pub admin_username: String,
    /// Password given to the default admin when it has to be created.
    pub admin_password: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            credentials_file: CREDENTIALS_FILE_NAME.to_string(),
            students_file: STUDENTS_FILE_NAME.to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin@123".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("STUDENTREC_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let storage = &self.storage;
        for (key, value) in [
            ("credentials_file", &storage.credentials_file),
            ("students_file", &storage.students_file),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{key} must not be empty"),
                });
            }
        }

        if storage.credentials_file == storage.students_file {
            return Err(Error::ConfigValidation {
                message: format!(
                    "credentials_file and students_file must differ (both are {:?})",
                    storage.credentials_file
                ),
            });
        }

        // Both values end up as tokens in the credential store
        for (key, value) in [
            ("admin_username", &self.bootstrap.admin_username),
            ("admin_password", &self.bootstrap.admin_password),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(Error::ConfigValidation {
                    message: format!("{key} must be a non-empty value without spaces"),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving the default if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of the credential store file.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.credentials_file)
    }

    /// Path of the student store file.
    #[must_use]
    pub fn students_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.students_file)
    }
}
