//! Device configuration types
//!
//! Everything that differs between deployments is data here rather than a
//! separate controller type: timings, colours, channel effects, and the
//! [`Capabilities`] that decide which verbs are registered.

use crate::color::{self, Rgb};

/// Number of LED channels addressable by `ch1`..`ch6`
pub const MAX_CHANNELS: usize = 6;

/// Status pixel colours for each feedback outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedbackColors {
    /// Command succeeded
    pub success: Rgb,
    /// Command recognised but arguments were bad
    pub argument_error: Rgb,
    /// Verb not recognised
    pub unrecognized: Rgb,
    /// Handler or hardware failure
    pub internal_error: Rgb,
    /// Data returned to the host
    pub data: Rgb,
    /// Outcome shown as "off" (e.g. after `persist on`)
    pub quiet: Rgb,
    /// Heartbeat flash
    pub heartbeat: Rgb,
    /// Flash shown once at start-up
    pub boot: Rgb,
}

impl Default for FeedbackColors {
    fn default() -> Self {
        Self {
            success: color::DARK_GREEN,
            argument_error: color::RED,
            unrecognized: color::ORANGE,
            internal_error: color::RED,
            data: color::FUCHSIA,
            quiet: color::BLACK,
            heartbeat: color::DARK_CYAN,
            boot: color::CYAN,
        }
    }
}

/// Heartbeat flash timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartbeatConfig {
    pub on_ms: u32,
    pub off_ms: u32,
    /// Enable the heartbeat this long after start-up (`None` = never)
    pub autostart_ms: Option<u32>,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            on_ms: 50,
            off_ms: 2950,
            autostart_ms: Some(7000),
        }
    }
}

/// Ring rotation and theme defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingConfig {
    pub rotate_hz: u32,
    pub theme_hz: u32,
    /// Theme timer ticks per full brightness cycle
    pub pulse_steps: u16,
    /// Active pixel count `theme on` tops up to
    pub theme_target: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            rotate_hz: 24,
            theme_hz: 24,
            pulse_steps: 40,
            theme_target: 12,
        }
    }
}

/// Effect assigned to one LED channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectConfig {
    /// Constant brightness while on
    Steady { brightness: f32 },
    /// Square-wave blink while on
    Blink { speed: f32, phase: f32, duty: f32 },
}

/// LED channel effects, by channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    pub effects: [EffectConfig; MAX_CHANNELS],
}

impl Default for ChannelConfig {
    fn default() -> Self {
        let steady = EffectConfig::Steady { brightness: 0.3 };
        Self {
            effects: [
                // channel 1 is a short navigation-light flash
                EffectConfig::Blink {
                    speed: 0.5,
                    phase: 0.0,
                    duty: 0.015,
                },
                steady,
                steady,
                steady,
                steady,
                steady,
            ],
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// How long command feedback stays on the status pixel
    pub feedback_window_ms: u32,
    /// Delay between acknowledging `reset` and performing it
    pub reset_delay_ms: u32,
    pub heartbeat: HeartbeatConfig,
    pub ring: RingConfig,
    pub channels: ChannelConfig,
    pub colors: FeedbackColors,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            feedback_window_ms: 1000,
            reset_delay_ms: 100,
            heartbeat: HeartbeatConfig::default(),
            ring: RingConfig::default(),
            channels: ChannelConfig::default(),
            colors: FeedbackColors::default(),
        }
    }
}

/// What a particular board is fitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Ring length, 0 when there is no ring
    pub ring_len: usize,
    /// Number of LED channels, 0 when there are none
    pub channel_count: usize,
    pub audio: bool,
    pub clock: bool,
    pub sensor: bool,
}

impl Capabilities {
    pub fn has_ring(&self) -> bool {
        self.ring_len > 0
    }

    pub fn has_channels(&self) -> bool {
        self.channel_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.feedback_window_ms, 1000);
        assert_eq!(config.heartbeat.on_ms + config.heartbeat.off_ms, 3000);
        assert_eq!(config.ring.rotate_hz, 24);
        assert_eq!(config.ring.pulse_steps, 40);
        assert_eq!(config.colors.unrecognized, color::ORANGE);
    }

    #[test]
    fn test_capabilities() {
        let caps = Capabilities {
            ring_len: 24,
            ..Default::default()
        };
        assert!(caps.has_ring());
        assert!(!caps.has_channels());
    }
}
