//! Configuration for the Piterface remote controller
//!
//! Describes the legal channel and volume ranges of a remote and the values it
//! returns to on power-up. Settings are validated once when they are built and
//! are immutable afterwards, so any number of controllers can share them.
//!
//! Settings come from three places: the builder, a generic key/value mapping
//! (as produced by a configuration loader) and TOML files.
//!
//! ```
//! use piterface_config::{Settings, SettingsBuilder};
//!
//! let settings = SettingsBuilder::default()
//!     .name("Living room")
//!     .channels(1, 50, 7)
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.default_channel(), 7);
//! assert_eq!(Settings::default().max_volume(), 100);
//! ```

mod settings;

pub use settings::{RECOGNIZED_KEYS, Settings, SettingsBuilder, ValidationError};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Table name under which settings may be nested in a shared config file
pub const SETTINGS_TABLE: &str = "remote";

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&contents)?;
        tracing::info!(
            "Settings '{}' loaded from {}",
            settings.name(),
            path.display()
        );
        Ok(settings)
    }

    /// Parse settings from TOML text.
    ///
    /// The keys may sit at the top level of the document or inside a
    /// `[remote]` table. When the table is present, other top-level sections
    /// belong to other components and are ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut document: toml::Table = toml::from_str(contents)?;

        let table = match document.remove(SETTINGS_TABLE) {
            Some(toml::Value::Table(table)) => table,
            Some(other) => {
                return Err(ValidationError::InvalidValue {
                    key: SETTINGS_TABLE.to_string(),
                    reason: format!("expected a table, found {}", other.type_str()),
                }
                .into());
            }
            None => document,
        };

        Ok(Self::from_mapping(&table)?)
    }

    /// Serialize the settings as a flat TOML document
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
