//! Channel and volume bounds

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keys accepted by [`Settings::from_mapping`]
pub const RECOGNIZED_KEYS: [&str; 7] = [
    "name",
    "min_channel",
    "max_channel",
    "default_channel",
    "min_volume",
    "max_volume",
    "default_volume",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The minimum channel ({min}) must be smaller than the maximum channel ({max})")]
    ChannelRange { min: i32, max: i32 },

    #[error("Default channel {default} must be within the allowed channel range {min}..={max}")]
    DefaultChannel { default: i32, min: i32, max: i32 },

    #[error("The minimum volume ({min}) must be smaller than the maximum volume ({max})")]
    VolumeRange { min: i32, max: i32 },

    #[error("Default volume {default} must be within the allowed volume range {min}..={max}")]
    DefaultVolume { default: i32, min: i32, max: i32 },

    /// Keys are sorted so the message is stable
    #[error("Unknown configuration keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Capabilities of a remote controller.
///
/// Always satisfies `min < max` on both axes with each default inside its
/// range. The only ways to obtain one are [`SettingsBuilder::build`],
/// [`Settings::from_mapping`] and deserialization, all of which validate.
/// Deserialization goes through `from_mapping`, so unknown keys are reported
/// the same way on both paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "toml::Table", into = "SettingsBuilder")]
pub struct Settings {
    name: String,
    min_channel: i32,
    max_channel: i32,
    default_channel: i32,
    min_volume: i32,
    max_volume: i32,
    default_volume: i32,
}

/// Unvalidated settings, with every field defaulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsBuilder {
    pub name: String,
    pub min_channel: i32,
    pub max_channel: i32,
    pub default_channel: i32,
    pub min_volume: i32,
    pub max_volume: i32,
    pub default_volume: i32,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            name: "Piter Face".to_string(),
            min_channel: 1,
            max_channel: 999,
            default_channel: 1,
            min_volume: 0,
            max_volume: 100,
            default_volume: 10,
        }
    }
}

impl SettingsBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the channel range and the power-up channel
    pub fn channels(mut self, min: i32, max: i32, default: i32) -> Self {
        self.min_channel = min;
        self.max_channel = max;
        self.default_channel = default;
        self
    }

    /// Set the volume range and the power-up volume
    pub fn volume(mut self, min: i32, max: i32, default: i32) -> Self {
        self.min_volume = min;
        self.max_volume = max;
        self.default_volume = default;
        self
    }

    /// Validate and freeze.
    ///
    /// Checks run in a fixed order (channel range, default channel, volume
    /// range, default volume) and the first violation is returned.
    pub fn build(self) -> Result<Settings, ValidationError> {
        if self.min_channel >= self.max_channel {
            return Err(ValidationError::ChannelRange {
                min: self.min_channel,
                max: self.max_channel,
            });
        }
        if !(self.min_channel..=self.max_channel).contains(&self.default_channel) {
            return Err(ValidationError::DefaultChannel {
                default: self.default_channel,
                min: self.min_channel,
                max: self.max_channel,
            });
        }
        if self.min_volume >= self.max_volume {
            return Err(ValidationError::VolumeRange {
                min: self.min_volume,
                max: self.max_volume,
            });
        }
        if !(self.min_volume..=self.max_volume).contains(&self.default_volume) {
            return Err(ValidationError::DefaultVolume {
                default: self.default_volume,
                min: self.min_volume,
                max: self.max_volume,
            });
        }

        Ok(Settings {
            name: self.name,
            min_channel: self.min_channel,
            max_channel: self.max_channel,
            default_channel: self.default_channel,
            min_volume: self.min_volume,
            max_volume: self.max_volume,
            default_volume: self.default_volume,
        })
    }
}

impl TryFrom<toml::Table> for Settings {
    type Error = ValidationError;

    fn try_from(mapping: toml::Table) -> Result<Self, Self::Error> {
        Settings::from_mapping(&mapping)
    }
}

impl From<Settings> for SettingsBuilder {
    fn from(settings: Settings) -> Self {
        Self {
            name: settings.name,
            min_channel: settings.min_channel,
            max_channel: settings.max_channel,
            default_channel: settings.default_channel,
            min_volume: settings.min_volume,
            max_volume: settings.max_volume,
            default_volume: settings.default_volume,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = SettingsBuilder::default();
        Self {
            name: defaults.name,
            min_channel: defaults.min_channel,
            max_channel: defaults.max_channel,
            default_channel: defaults.default_channel,
            min_volume: defaults.min_volume,
            max_volume: defaults.max_volume,
            default_volume: defaults.default_volume,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Build settings from a generic key/value mapping.
    ///
    /// Unknown keys are rejected all at once. Recognized keys override the
    /// defaults and the result is validated like any other construction.
    pub fn from_mapping(mapping: &toml::Table) -> Result<Self, ValidationError> {
        let mut unknown: Vec<String> = mapping
            .keys()
            .filter(|key| !RECOGNIZED_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ValidationError::UnknownKeys(unknown));
        }

        let mut builder = SettingsBuilder::default();
        for (key, value) in mapping {
            match key.as_str() {
                "name" => {
                    builder.name = value
                        .as_str()
                        .ok_or_else(|| invalid_type(key, "a string", value))?
                        .to_string();
                }
                "min_channel" => builder.min_channel = integer_value(key, value)?,
                "max_channel" => builder.max_channel = integer_value(key, value)?,
                "default_channel" => builder.default_channel = integer_value(key, value)?,
                "min_volume" => builder.min_volume = integer_value(key, value)?,
                "max_volume" => builder.max_volume = integer_value(key, value)?,
                "default_volume" => builder.default_volume = integer_value(key, value)?,
                _ => {}
            }
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_channel(&self) -> i32 {
        self.min_channel
    }

    pub fn max_channel(&self) -> i32 {
        self.max_channel
    }

    pub fn default_channel(&self) -> i32 {
        self.default_channel
    }

    pub fn min_volume(&self) -> i32 {
        self.min_volume
    }

    pub fn max_volume(&self) -> i32 {
        self.max_volume
    }

    pub fn default_volume(&self) -> i32 {
        self.default_volume
    }

    /// Whether `channel` lies in `min_channel..=max_channel`
    pub fn contains_channel(&self, channel: i32) -> bool {
        (self.min_channel..=self.max_channel).contains(&channel)
    }

    /// Number of tunable channels
    pub fn channel_count(&self) -> u32 {
        // max > min is guaranteed, so the difference is positive
        self.max_channel.abs_diff(self.min_channel) + 1
    }
}

fn invalid_type(key: &str, expected: &str, value: &toml::Value) -> ValidationError {
    ValidationError::InvalidValue {
        key: key.to_string(),
        reason: format!("expected {}, found {}", expected, value.type_str()),
    }
}

fn integer_value(key: &str, value: &toml::Value) -> Result<i32, ValidationError> {
    let raw = value
        .as_integer()
        .ok_or_else(|| invalid_type(key, "an integer", value))?;

    i32::try_from(raw).map_err(|_| ValidationError::InvalidValue {
        key: key.to_string(),
        reason: format!("{} is out of range", raw),
    })
}
