//! LED channel effects
//!
//! Each channel runs either a steady or a blink effect while switched on.
//! The scheduler tick advances every effect and writes the resulting
//! brightness to the [`LedChannels`] collaborator.

use beacon_hal::LedChannels;

use crate::config::{ChannelConfig, EffectConfig, MAX_CHANNELS};

/// Running state of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelEffect {
    config: EffectConfig,
    on: bool,
    /// Blink cycle position in `[0, 1)`
    offset: f32,
}

impl ChannelEffect {
    pub fn new(config: EffectConfig) -> Self {
        Self {
            config,
            on: false,
            offset: 0.0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Advance by `delta_ms` and return the brightness to output
    pub fn advance(&mut self, delta_ms: u32) -> f32 {
        match self.config {
            EffectConfig::Steady { brightness } => {
                if self.on {
                    brightness
                } else {
                    0.0
                }
            }
            EffectConfig::Blink { speed, phase, duty } => {
                self.offset = (self.offset + delta_ms as f32 * speed / 1000.0) % 1.0;
                if self.on && (self.offset + phase) % 1.0 < duty {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// All channels of a board
pub struct ChannelBank<L: LedChannels> {
    outputs: L,
    effects: heapless::Vec<ChannelEffect, MAX_CHANNELS>,
}

impl<L: LedChannels> ChannelBank<L> {
    pub fn new(outputs: L, config: &ChannelConfig) -> Self {
        let count = outputs.channel_count().min(MAX_CHANNELS);
        let effects = config.effects[..count]
            .iter()
            .map(|&c| ChannelEffect::new(c))
            .collect();
        Self { outputs, effects }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn outputs(&self) -> &L {
        &self.outputs
    }

    pub fn effect(&self, index: usize) -> Option<&ChannelEffect> {
        self.effects.get(index)
    }

    /// Switch one channel (0-based). Returns `false` if out of range.
    pub fn set(&mut self, index: usize, on: bool) -> bool {
        match self.effects.get_mut(index) {
            Some(effect) => {
                effect.set_on(on);
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, on: bool) {
        for effect in self.effects.iter_mut() {
            effect.set_on(on);
        }
    }

    pub fn tick(&mut self, delta_ms: u32) {
        for (index, effect) in self.effects.iter_mut().enumerate() {
            let level = effect.advance(delta_ms);
            self.outputs.set_brightness(index, level);
        }
    }
}
