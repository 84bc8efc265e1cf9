//! Remote controller state machine
//!
//! Models a consumer remote control: power, channel selection, volume and mute.
//! Every mutation is guarded. Channel and volume changes require the device to
//! be powered on, and each fallible operation checks its input before touching
//! any state, so a rejected call leaves the controller exactly as it was.
//!
//! # Example
//!
//! ```
//! use piterface_remote::{Controller, StateError};
//!
//! fn main() -> Result<(), StateError> {
//!     let mut remote = Controller::default();
//!     assert!(remote.set_channel(5).is_err());
//!
//!     remote.power_on();
//!     remote.set_channel(42)?;
//!     remote.increase_volume(5)?;
//!
//!     let state = remote.snapshot();
//!     assert_eq!(state.current_channel, 42);
//!     assert_eq!(state.volume, 15);
//!     Ok(())
//! }
//! ```
//!
//! The controller takes `&mut self` for every mutation and holds no locks.
//! Callers sharing one across threads must serialize access themselves.

pub mod command;
pub mod controller;
pub mod snapshot;

pub use command::{CommandParseError, RemoteCommand};
pub use controller::{Controller, StateError};
pub use snapshot::StateSnapshot;

pub use piterface_config::Settings;

/// Remote result type
pub type Result<T> = std::result::Result<T, StateError>;
