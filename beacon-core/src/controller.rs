//! Verb execution context
//!
//! The [`Controller`] owns every collaborator a verb may touch. Verb
//! handlers receive it mutably from the dispatcher and the deferred queue;
//! nothing else reaches the hardware.

use beacon_hal::SystemControl;

use crate::board::{Board, Peripherals};
use crate::channels::ChannelBank;
use crate::config::{Capabilities, DeviceConfig};
use crate::dispatch::VerbError;
use crate::output::OutputArbiter;

pub struct Controller<B: Board> {
    output: OutputArbiter<B>,
    channels: Option<ChannelBank<B::Channels>>,
    audio: Option<B::Audio>,
    clock: Option<B::Clock>,
    sensor: Option<B::Sensor>,
    system: B::System,
    config: DeviceConfig,
    capabilities: Capabilities,
    /// Scheduler time of the command or tick being handled
    now_ms: u64,
    started_at_ms: u64,
    services_started: bool,
    reset_requested_at: Option<u64>,
}

impl<B: Board> Controller<B> {
    pub fn new(peripherals: Peripherals<B>, config: DeviceConfig, now_ms: u64) -> Self {
        let capabilities = peripherals.capabilities();
        let Peripherals {
            status,
            ring,
            channels,
            audio,
            clock,
            sensor,
            system,
            rng,
        } = peripherals;
        Self {
            output: OutputArbiter::new(status, ring, rng, &config),
            channels: channels.map(|c| ChannelBank::new(c, &config.channels)),
            audio,
            clock,
            sensor,
            system,
            config,
            capabilities,
            now_ms,
            started_at_ms: now_ms,
            services_started: false,
            reset_requested_at: None,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub(crate) fn set_now(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    pub fn output(&self) -> &OutputArbiter<B> {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputArbiter<B> {
        &mut self.output
    }

    pub fn channels(&self) -> Option<&ChannelBank<B::Channels>> {
        self.channels.as_ref()
    }

    pub fn channels_mut(&mut self) -> Result<&mut ChannelBank<B::Channels>, VerbError> {
        self.channels.as_mut().ok_or(VerbError::Unsupported)
    }

    pub fn audio(&self) -> Option<&B::Audio> {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> Result<&mut B::Audio, VerbError> {
        self.audio.as_mut().ok_or(VerbError::Unsupported)
    }

    pub fn clock(&self) -> Option<&B::Clock> {
        self.clock.as_ref()
    }

    pub fn clock_mut(&mut self) -> Result<&mut B::Clock, VerbError> {
        self.clock.as_mut().ok_or(VerbError::Unsupported)
    }

    pub fn sensor_mut(&mut self) -> Option<&mut B::Sensor> {
        self.sensor.as_mut()
    }

    pub fn system(&self) -> &B::System {
        &self.system
    }

    /// Ask for a reset once the current reply has been written
    pub fn request_reset(&mut self) {
        if self.reset_requested_at.is_none() {
            self.reset_requested_at = Some(self.now_ms);
        }
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_requested_at.is_some()
    }

    /// Perform a requested reset once the reply delay has passed.
    /// Returns `true` if the reset was performed.
    pub(crate) fn reset_if_due(&mut self, now_ms: u64) -> bool {
        match self.reset_requested_at {
            Some(at) if now_ms >= at + self.config.reset_delay_ms as u64 => {
                warn!("performing reset");
                self.reset_requested_at = None;
                self.system.reset();
                true
            }
            _ => false,
        }
    }

    /// Start delayed services (heartbeat) once the autostart delay has passed
    pub(crate) fn start_services_if_due(&mut self, now_ms: u64) {
        if self.services_started {
            return;
        }
        let Some(delay) = self.config.heartbeat.autostart_ms else {
            self.services_started = true;
            return;
        };
        if now_ms >= self.started_at_ms + delay as u64 {
            info!("starting services after {} ms", now_ms - self.started_at_ms);
            self.services_started = true;
            self.output.set_heartbeat(true);
        }
    }

    pub fn services_started(&self) -> bool {
        self.services_started
    }

    pub(crate) fn tick_channels(&mut self, delta_ms: u32) {
        if let Some(channels) = self.channels.as_mut() {
            channels.tick(delta_ms);
        }
    }
}
