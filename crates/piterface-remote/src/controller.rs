//! Power, channel and volume state
//!
//! Handles the guarded transitions of a single remote. The mute memory is a
//! small state machine nested inside the powered-on state.

use crate::command::RemoteCommand;
use crate::snapshot::StateSnapshot;
use crate::Result;
use piterface_config::Settings;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("The device must be powered on to {0}")]
    PoweredOff(&'static str),

    #[error("Channel {channel} is outside of the allowed range {min}..={max}")]
    ChannelOutOfRange { channel: i32, min: i32, max: i32 },

    #[error("Volume step must be non-negative, got {0}")]
    NegativeStep(i32),
}

/// Mute sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MuteState {
    Unmuted,
    /// Volume to go back to on unmute
    Muted { restore_volume: i32 },
}

/// A single remote controller bound to shared settings
#[derive(Debug, Clone)]
pub struct Controller {
    settings: Arc<Settings>,
    is_on: bool,
    current_channel: i32,
    volume: i32,
    mute: MuteState,
}

impl Controller {
    /// Create a powered-off controller at the configured defaults
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            is_on: false,
            current_channel: settings.default_channel(),
            volume: settings.default_volume(),
            mute: MuteState::Unmuted,
            settings,
        }
    }

    // Power

    /// Turn the device on, resetting channel and volume to their defaults
    pub fn power_on(&mut self) {
        self.is_on = true;
        self.mute = MuteState::Unmuted;
        self.volume = self.settings.default_volume();
        self.current_channel = self.settings.default_channel();
        tracing::debug!(
            "Powered on at channel {} volume {}",
            self.current_channel,
            self.volume
        );
    }

    /// Turn the device off. Channel and volume are kept but reset on the next power-on.
    pub fn power_off(&mut self) {
        self.is_on = false;
        self.mute = MuteState::Unmuted;
        tracing::debug!("Powered off");
    }

    pub fn toggle_power(&mut self) {
        if self.is_on {
            self.power_off();
        } else {
            self.power_on();
        }
    }

    // Channels

    /// Tune to `channel`
    pub fn set_channel(&mut self, channel: i32) -> Result<()> {
        self.require_on("change the channel")?;
        if !self.settings.contains_channel(channel) {
            let err = StateError::ChannelOutOfRange {
                channel,
                min: self.settings.min_channel(),
                max: self.settings.max_channel(),
            };
            tracing::warn!("{}", err);
            return Err(err);
        }

        self.current_channel = channel;
        tracing::debug!("Channel set to {}", channel);
        Ok(())
    }

    /// Advance one channel, wrapping from the last channel to the first
    pub fn next_channel(&mut self) -> Result<()> {
        self.require_on("change the channel")?;
        self.current_channel = if self.current_channel >= self.settings.max_channel() {
            self.settings.min_channel()
        } else {
            self.current_channel + 1
        };
        tracing::debug!("Channel up to {}", self.current_channel);
        Ok(())
    }

    /// Go back one channel, wrapping from the first channel to the last
    pub fn previous_channel(&mut self) -> Result<()> {
        self.require_on("change the channel")?;
        self.current_channel = if self.current_channel <= self.settings.min_channel() {
            self.settings.max_channel()
        } else {
            self.current_channel - 1
        };
        tracing::debug!("Channel down to {}", self.current_channel);
        Ok(())
    }

    // Volume

    /// Raise the volume by `step`, saturating at `max_volume`.
    ///
    /// Raising a muted device above zero unmutes it and forgets the
    /// remembered volume.
    pub fn increase_volume(&mut self, step: i32) -> Result<()> {
        self.require_on("change the volume")?;
        let step = non_negative(step)?;

        self.volume = self.clamp_volume(self.volume.saturating_add(step));
        if self.is_muted() && self.volume > 0 {
            self.mute = MuteState::Unmuted;
        }
        tracing::debug!("Volume up to {}", self.volume);
        Ok(())
    }

    /// Lower the volume by `step`, saturating at `min_volume`.
    ///
    /// Reaching the floor mutes the device. Any other result clears the mute
    /// memory.
    pub fn decrease_volume(&mut self, step: i32) -> Result<()> {
        self.require_on("change the volume")?;
        let step = non_negative(step)?;

        self.volume = self.clamp_volume(self.volume.saturating_sub(step));
        if self.volume == self.settings.min_volume() {
            if let MuteState::Unmuted = self.mute {
                self.mute = MuteState::Muted {
                    restore_volume: self.settings.default_volume(),
                };
            }
        } else {
            self.mute = MuteState::Unmuted;
        }
        tracing::debug!("Volume down to {}", self.volume);
        Ok(())
    }

    pub fn volume_up(&mut self) -> Result<()> {
        self.increase_volume(1)
    }

    pub fn volume_down(&mut self) -> Result<()> {
        self.decrease_volume(1)
    }

    /// Mute, remembering the current volume. No-op when already muted.
    pub fn mute(&mut self) -> Result<()> {
        self.require_on("mute")?;
        if let MuteState::Unmuted = self.mute {
            self.mute = MuteState::Muted {
                restore_volume: self.volume,
            };
            self.volume = 0;
            tracing::info!("Muted");
        }
        Ok(())
    }

    /// Restore the remembered volume. No-op when not muted.
    pub fn unmute(&mut self) -> Result<()> {
        self.require_on("unmute")?;
        if let MuteState::Muted { restore_volume } = self.mute {
            self.volume = restore_volume;
            self.mute = MuteState::Unmuted;
            tracing::info!("Unmuted at volume {}", self.volume);
        }
        Ok(())
    }

    pub fn toggle_mute(&mut self) -> Result<()> {
        if self.is_muted() {
            self.unmute()
        } else {
            self.mute()
        }
    }

    /// Run a single command against this controller
    pub fn apply(&mut self, command: RemoteCommand) -> Result<()> {
        tracing::trace!("Applying {}", command);
        match command {
            RemoteCommand::PowerOn => self.power_on(),
            RemoteCommand::PowerOff => self.power_off(),
            RemoteCommand::TogglePower => self.toggle_power(),
            RemoteCommand::SetChannel(channel) => self.set_channel(channel)?,
            RemoteCommand::NextChannel => self.next_channel()?,
            RemoteCommand::PreviousChannel => self.previous_channel()?,
            RemoteCommand::VolumeUp(step) => self.increase_volume(step)?,
            RemoteCommand::VolumeDown(step) => self.decrease_volume(step)?,
            RemoteCommand::Mute => self.mute()?,
            RemoteCommand::Unmute => self.unmute()?,
            RemoteCommand::ToggleMute => self.toggle_mute()?,
        }
        Ok(())
    }

    // Queries

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn current_channel(&self) -> i32 {
        self.current_channel
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.is_muted()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Copy out the observable state
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            is_on: self.is_on,
            current_channel: self.current_channel,
            volume: self.volume,
            muted: self.is_muted(),
        }
    }

    fn is_muted(&self) -> bool {
        matches!(self.mute, MuteState::Muted { .. })
    }

    fn clamp_volume(&self, volume: i32) -> i32 {
        volume.clamp(self.settings.min_volume(), self.settings.max_volume())
    }

    fn require_on(&self, action: &'static str) -> Result<()> {
        if self.is_on {
            Ok(())
        } else {
            tracing::warn!("Rejected while powered off: {}", action);
            Err(StateError::PoweredOff(action))
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Arc::new(Settings::default()))
    }
}

fn non_negative(step: i32) -> Result<i32> {
    if step < 0 {
        tracing::warn!("Rejected negative volume step {}", step);
        Err(StateError::NegativeStep(step))
    } else {
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered_on() -> Controller {
        let mut remote = Controller::default();
        remote.power_on();
        remote
    }

    fn with_settings(min_volume: i32, max_volume: i32, default_volume: i32) -> Controller {
        let settings = Settings::builder()
            .channels(1, 20, 4)
            .volume(min_volume, max_volume, default_volume)
            .build()
            .unwrap();
        let mut remote = Controller::new(Arc::new(settings));
        remote.power_on();
        remote
    }

    #[test]
    fn test_initial_state_is_off() {
        let remote = Controller::default();
        let state = remote.snapshot();
        assert!(!state.is_on);
        assert_eq!(state.current_channel, remote.settings().default_channel());
        assert_eq!(state.volume, remote.settings().default_volume());
        assert!(!state.muted);
    }

    #[test]
    fn test_power_on_resets_defaults() {
        let mut remote = powered_on();
        remote.set_channel(10).unwrap();
        remote.increase_volume(5).unwrap();
        remote.mute().unwrap();
        remote.power_on();

        assert_eq!(remote.current_channel(), 1);
        assert_eq!(remote.volume(), 10);
        assert!(!remote.muted());
    }

    #[test]
    fn test_power_off_keeps_tuning_but_clears_mute() {
        let mut remote = powered_on();
        remote.set_channel(33).unwrap();
        remote.mute().unwrap();
        remote.power_off();

        assert!(!remote.is_on());
        assert!(!remote.muted());
        assert_eq!(remote.current_channel(), 33);
    }

    #[test]
    fn test_toggle_power() {
        let mut remote = Controller::default();
        remote.toggle_power();
        assert!(remote.is_on());
        remote.toggle_power();
        assert!(!remote.is_on());
    }

    #[test]
    fn test_channel_change_requires_power() {
        let mut remote = Controller::default();
        assert_eq!(
            remote.set_channel(5),
            Err(StateError::PoweredOff("change the channel"))
        );
        assert!(remote.next_channel().is_err());
        assert!(remote.previous_channel().is_err());
    }

    #[test]
    fn test_volume_and_mute_require_power() {
        let mut remote = Controller::default();
        assert!(matches!(remote.increase_volume(1), Err(StateError::PoweredOff(_))));
        assert!(matches!(remote.decrease_volume(1), Err(StateError::PoweredOff(_))));
        assert!(matches!(remote.mute(), Err(StateError::PoweredOff(_))));
        assert!(matches!(remote.unmute(), Err(StateError::PoweredOff(_))));
        assert!(matches!(remote.toggle_mute(), Err(StateError::PoweredOff(_))));
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let mut remote = powered_on();
        let err = remote.set_channel(1000).unwrap_err();
        assert_eq!(
            err,
            StateError::ChannelOutOfRange {
                channel: 1000,
                min: 1,
                max: 999
            }
        );
        assert!(remote.set_channel(0).is_err());
        assert_eq!(remote.current_channel(), 1);
    }

    #[test]
    fn test_channel_wraps_next_previous() {
        let mut remote = powered_on();
        remote.set_channel(999).unwrap();
        remote.next_channel().unwrap();
        assert_eq!(remote.current_channel(), 1);
        remote.previous_channel().unwrap();
        assert_eq!(remote.current_channel(), 999);
    }

    #[test]
    fn test_channel_steps() {
        let mut remote = powered_on();
        remote.set_channel(50).unwrap();
        remote.next_channel().unwrap();
        remote.next_channel().unwrap();
        remote.previous_channel().unwrap();
        assert_eq!(remote.current_channel(), 51);
    }

    #[test]
    fn test_volume_limits_and_mute() {
        let mut remote = powered_on();
        remote.increase_volume(500).unwrap();
        assert_eq!(remote.volume(), 100);
        remote.decrease_volume(1000).unwrap();
        assert_eq!(remote.volume(), 0);
        assert!(remote.muted());
    }

    #[test]
    fn test_volume_saturates_on_extreme_steps() {
        let mut remote = powered_on();
        remote.increase_volume(i32::MAX).unwrap();
        assert_eq!(remote.volume(), 100);
        remote.decrease_volume(i32::MAX).unwrap();
        assert_eq!(remote.volume(), 0);
    }

    #[test]
    fn test_single_volume_steps() {
        let mut remote = powered_on();
        remote.volume_up().unwrap();
        assert_eq!(remote.volume(), 11);
        remote.volume_down().unwrap();
        remote.volume_down().unwrap();
        assert_eq!(remote.volume(), 9);

        remote.power_off();
        let before = remote.snapshot();
        assert_eq!(remote.volume_up(), Err(StateError::PoweredOff("change the volume")));
        assert_eq!(remote.volume_down(), Err(StateError::PoweredOff("change the volume")));
        assert_eq!(remote.snapshot(), before);
    }

    #[test]
    fn test_negative_volume_step_rejected() {
        let mut remote = powered_on();
        assert_eq!(remote.increase_volume(-1), Err(StateError::NegativeStep(-1)));
        assert_eq!(remote.decrease_volume(-1), Err(StateError::NegativeStep(-1)));
        assert_eq!(remote.volume(), 10);
    }

    #[test]
    fn test_mute_unmute_restores_volume() {
        let mut remote = powered_on();
        remote.increase_volume(3).unwrap();
        let previous_volume = remote.volume();

        remote.mute().unwrap();
        assert!(remote.muted());
        assert_eq!(remote.volume(), 0);

        remote.unmute().unwrap();
        assert!(!remote.muted());
        assert_eq!(remote.volume(), previous_volume);
    }

    #[test]
    fn test_mute_twice_keeps_first_volume() {
        let mut remote = powered_on();
        remote.increase_volume(20).unwrap();
        remote.mute().unwrap();
        remote.mute().unwrap();
        remote.unmute().unwrap();
        assert_eq!(remote.volume(), 30);
    }

    #[test]
    fn test_unmute_when_not_muted_is_noop() {
        let mut remote = powered_on();
        remote.increase_volume(2).unwrap();
        remote.unmute().unwrap();
        assert_eq!(remote.volume(), 12);
        assert!(!remote.muted());
    }

    #[test]
    fn test_unmute_after_floor_uses_default() {
        // Reaching the floor mutes without remembering a volume
        let mut remote = powered_on();
        remote.increase_volume(40).unwrap();
        remote.decrease_volume(100).unwrap();
        assert!(remote.muted());

        remote.unmute().unwrap();
        assert_eq!(remote.volume(), remote.settings().default_volume());
        assert!(!remote.muted());
    }

    #[test]
    fn test_decrease_while_muted_keeps_remembered_volume() {
        let mut remote = powered_on();
        remote.increase_volume(15).unwrap();
        remote.mute().unwrap();
        remote.decrease_volume(1).unwrap();
        assert!(remote.muted());

        remote.unmute().unwrap();
        assert_eq!(remote.volume(), 25);
    }

    #[test]
    fn test_increase_while_muted_unmutes() {
        let mut remote = powered_on();
        remote.mute().unwrap();
        remote.increase_volume(4).unwrap();
        assert!(!remote.muted());
        assert_eq!(remote.volume(), 4);

        // Zero step from a muted zero stays muted
        remote.mute().unwrap();
        remote.increase_volume(0).unwrap();
        assert!(remote.muted());
    }

    #[test]
    fn test_decrease_above_floor_clears_mute() {
        let mut remote = with_settings(-10, 10, 5);
        remote.mute().unwrap();
        assert_eq!(remote.volume(), 0);

        remote.decrease_volume(1).unwrap();
        assert_eq!(remote.volume(), -1);
        assert!(!remote.muted());

        // The remembered volume is gone, so unmute does nothing
        remote.unmute().unwrap();
        assert_eq!(remote.volume(), -1);
    }

    #[test]
    fn test_nonzero_floor_triggers_mute() {
        let mut remote = with_settings(10, 50, 30);
        remote.decrease_volume(25).unwrap();
        assert_eq!(remote.volume(), 10);
        assert!(remote.muted());

        remote.unmute().unwrap();
        assert_eq!(remote.volume(), 30);
    }

    #[test]
    fn test_toggle_mute() {
        let mut remote = powered_on();
        remote.toggle_mute().unwrap();
        assert!(remote.muted());
        assert_eq!(remote.volume(), 0);
        remote.toggle_mute().unwrap();
        assert!(!remote.muted());
        assert_eq!(remote.volume(), 10);
    }

    #[test]
    fn test_apply_dispatches() {
        let mut remote = Controller::default();
        remote.apply(RemoteCommand::PowerOn).unwrap();
        remote.apply(RemoteCommand::SetChannel(7)).unwrap();
        remote.apply(RemoteCommand::VolumeUp(5)).unwrap();
        remote.apply(RemoteCommand::Mute).unwrap();

        let state = remote.snapshot();
        assert_eq!(state.current_channel, 7);
        assert_eq!(state.volume, 0);
        assert!(state.muted);

        assert_eq!(
            remote.apply(RemoteCommand::VolumeDown(-3)),
            Err(StateError::NegativeStep(-3))
        );
    }

    #[test]
    fn test_controllers_share_settings() {
        let settings = Arc::new(Settings::builder().channels(1, 9, 2).build().unwrap());
        let mut first = Controller::new(Arc::clone(&settings));
        let second = Controller::new(Arc::clone(&settings));

        first.power_on();
        first.next_channel().unwrap();
        assert_eq!(first.current_channel(), 3);
        assert_eq!(second.current_channel(), 2);
        assert_eq!(Arc::strong_count(&settings), 3);
    }

    #[test]
    fn test_state_error_display() {
        let err = StateError::PoweredOff("change the channel");
        assert_eq!(
            err.to_string(),
            "The device must be powered on to change the channel"
        );

        let err = StateError::NegativeStep(-2);
        assert!(err.to_string().contains("non-negative"));
    }
}
