//! Remote commands as values
//!
//! Lets embedding systems queue, log and parse button presses before handing
//! them to [`Controller::apply`](crate::Controller::apply).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Command '{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Command '{command}' takes no argument, got '{argument}'")]
    UnexpectedArgument { command: String, argument: String },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

/// One button press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "kebab-case")]
pub enum RemoteCommand {
    PowerOn,
    PowerOff,
    TogglePower,
    SetChannel(i32),
    NextChannel,
    PreviousChannel,
    VolumeUp(i32),
    VolumeDown(i32),
    Mute,
    Unmute,
    ToggleMute,
}

impl RemoteCommand {
    /// Command name as used by the text form
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCommand::PowerOn => "power-on",
            RemoteCommand::PowerOff => "power-off",
            RemoteCommand::TogglePower => "power",
            RemoteCommand::SetChannel(_) => "channel",
            RemoteCommand::NextChannel => "channel-up",
            RemoteCommand::PreviousChannel => "channel-down",
            RemoteCommand::VolumeUp(_) => "volume-up",
            RemoteCommand::VolumeDown(_) => "volume-down",
            RemoteCommand::Mute => "mute",
            RemoteCommand::Unmute => "unmute",
            RemoteCommand::ToggleMute => "toggle-mute",
        }
    }

    fn takes_argument(&self) -> bool {
        matches!(
            self,
            RemoteCommand::SetChannel(_) | RemoteCommand::VolumeUp(_) | RemoteCommand::VolumeDown(_)
        )
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCommand::SetChannel(value)
            | RemoteCommand::VolumeUp(value)
            | RemoteCommand::VolumeDown(value) => write!(f, "{} {}", self.as_str(), value),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl FromStr for RemoteCommand {
    type Err = CommandParseError;

    /// Parse `"<name> [argument]"`, e.g. `channel 42` or `volume-up`.
    ///
    /// Volume steps default to 1; `channel` requires its argument.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().ok_or(CommandParseError::Empty)?;
        let argument = parts.next();
        if let Some(extra) = parts.next() {
            return Err(CommandParseError::UnexpectedArgument {
                command: name.to_string(),
                argument: extra.to_string(),
            });
        }

        let command = match name.to_ascii_lowercase().as_str() {
            "power-on" | "on" => RemoteCommand::PowerOn,
            "power-off" | "off" => RemoteCommand::PowerOff,
            "power" | "toggle-power" => RemoteCommand::TogglePower,
            "channel" => RemoteCommand::SetChannel(
                argument
                    .map(|value| parse_integer("channel", value))
                    .ok_or(CommandParseError::MissingArgument("channel"))??,
            ),
            "channel-up" | "next" => RemoteCommand::NextChannel,
            "channel-down" | "prev" | "previous" => RemoteCommand::PreviousChannel,
            "volume-up" | "vol+" => RemoteCommand::VolumeUp(
                argument.map_or(Ok(1), |value| parse_integer("volume-up", value))?,
            ),
            "volume-down" | "vol-" => RemoteCommand::VolumeDown(
                argument.map_or(Ok(1), |value| parse_integer("volume-down", value))?,
            ),
            "mute" => RemoteCommand::Mute,
            "unmute" => RemoteCommand::Unmute,
            "toggle-mute" => RemoteCommand::ToggleMute,
            _ => return Err(CommandParseError::Unknown(name.to_string())),
        };

        // Only the three valued commands take an argument
        if let (Some(extra), false) = (argument, command.takes_argument()) {
            return Err(CommandParseError::UnexpectedArgument {
                command: name.to_string(),
                argument: extra.to_string(),
            });
        }

        Ok(command)
    }
}

fn parse_integer(command: &'static str, value: &str) -> Result<i32, CommandParseError> {
    value
        .parse()
        .map_err(|_| CommandParseError::InvalidArgument {
            command,
            value: value.to_string(),
        })
}
