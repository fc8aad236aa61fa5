//! Configuration management
//!
//! This module handles loading, validation, and management of the FocusFlow
//! lifecycle configuration. Configuration is stored in TOML format at
//! ~/.focusflow/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Data directory and log level
//! - **storage**: Shared plugins base directory and database path
//! - **bundle**: Where the built bundle is copied from
//!
//! Every section and field has a default, so an empty config file is valid.
//! ~ in paths is expanded to the user's home directory, and directories the
//! lifecycle manager owns are created on first load.
//!
//! # Examples
//!
//! ```no_run
//! use focusflow_lifecycle::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Database: {:?}", config.storage.database);
//! # Ok(())
//! # }
//! ```

use sdk::errors::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from ~/.focusflow/config.toml, or built from defaults when the
/// file does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bundle source settings
    #[serde(default)]
    pub bundle: BundleConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Storage locations for shared bundles and the host database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory holding `shared/<slug>/<version>` bundle trees
    /// (supports ~ expansion)
    #[serde(default = "default_plugins_base_dir")]
    pub plugins_base_dir: PathBuf,

    /// SQLite database file with the plugin, module, and pages tables
    /// (supports ~ expansion)
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            plugins_base_dir: default_plugins_base_dir(),
            database: default_database(),
        }
    }
}

/// Bundle source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Directory the built bundle is copied from during install
    /// (supports ~ expansion)
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.focusflow")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_plugins_base_dir() -> PathBuf {
    PathBuf::from("~/.focusflow/plugins")
}

fn default_database() -> PathBuf {
    PathBuf::from("~/.focusflow/focusflow.db")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from the default location (~/.focusflow/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default one there.
    /// Validates the configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, TOML parsing
    /// fails, or validation fails.
    pub fn load_or_create() -> Result<Self, LifecycleError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails.
    pub fn load_from_path(path: &Path) -> Result<Self, LifecycleError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| LifecycleError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| LifecycleError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save it to path
    fn create_default(path: &Path) -> Result<Self, LifecycleError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LifecycleError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| LifecycleError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| LifecycleError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.focusflow/config.toml)
    fn default_config_path() -> Result<PathBuf, LifecycleError> {
        let home = dirs::home_dir().ok_or_else(|| {
            LifecycleError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".focusflow").join("config.toml"))
    }

    /// Create a default configuration
    fn default_config() -> Self {
        Self {
            core: CoreConfig::default(),
            storage: StorageConfig::default(),
            bundle: BundleConfig::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// Validates the log level, expands ~ in every path, and creates the
    /// directories the lifecycle manager owns (data dir and plugins base
    /// dir). The bundle source directory is left untouched: it belongs to the
    /// plugin checkout and missing sources are reported at install time.
    fn validate_and_process(&mut self) -> Result<(), LifecycleError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(LifecycleError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                LifecycleError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        self.storage.plugins_base_dir = expand_path(&self.storage.plugins_base_dir)?;
        self.storage.plugins_base_dir = canonicalize_or_create(&self.storage.plugins_base_dir)?;
        if !self.storage.plugins_base_dir.is_dir() {
            return Err(LifecycleError::Config(format!(
                "Plugins base path is not a directory: {:?}",
                self.storage.plugins_base_dir
            )));
        }

        // The database file itself is created on first open
        self.storage.database = expand_path(&self.storage.database)?;

        self.bundle.source_dir = expand_path(&self.bundle.source_dir)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, LifecycleError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| LifecycleError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            LifecycleError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir().ok_or_else(|| {
            LifecycleError::Config("Could not determine home directory".to_string())
        })
    } else {
        Ok(path.to_path_buf())
    }
}

/// Canonicalize path, creating it if it doesn't exist
fn canonicalize_or_create(path: &Path) -> Result<PathBuf, LifecycleError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            LifecycleError::Config(format!("Failed to create directory {:?}: {}", path, e))
        })?;
    }

    path.canonicalize().map_err(|e| {
        LifecycleError::Config(format!("Failed to canonicalize {:?}: {}", path, e))
    })
}
