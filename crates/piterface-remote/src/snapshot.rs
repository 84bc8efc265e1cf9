//! Point-in-time view of a controller

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable controller state at the moment [`Controller::snapshot`] was called.
///
/// A plain value with no link back to the controller. Serializes to
/// `{"is_on", "current_channel", "volume", "muted"}` for status displays and
/// telemetry.
///
/// [`Controller::snapshot`]: crate::Controller::snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub is_on: bool,
    pub current_channel: i32,
    pub volume: i32,
    pub muted: bool,
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on {
            return write!(f, "off");
        }

        write!(f, "on, channel {}, volume {}", self.current_channel, self.volume)?;
        if self.muted {
            write!(f, " (muted)")?;
        }
        Ok(())
    }
}
