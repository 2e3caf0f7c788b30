//! Output arbiter state machine
//!
//! Serialises every change to the status pixel and ring across command
//! feedback, heartbeat, rotation and theme pulsation.
//!
//! ```text
//!              present(feedback)
//!   ┌────────┐ ───────────────────▶ ┌──────────┐
//!   │ Steady │                      │ Feedback │
//!   └────────┘ ◀─────────────────── └──────────┘
//!                now >= deadline
//!          (revert to black unless persist)
//! ```
//!
//! Modulators on top of the two modes:
//! - **persist**: on expiry the feedback colour stays instead of reverting
//! - **heartbeat**: a short flash while `Steady`; suspended while a theme runs
//! - **rotate** / **theme**: ring effects applied from pending flags

use beacon_hal::{PixelStrip, Rgb};

use crate::board::{Board, RingPeripherals};
use crate::config::{DeviceConfig, FeedbackColors};
use crate::output::flags::{Pending, PendingFlags};
use crate::output::heartbeat::{Beat, Heartbeat};
use crate::output::ring_driver::RingDriver;

/// Outcome class of a processed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedbackClass {
    Success,
    ArgumentError,
    Unrecognized,
    InternalError,
    Data,
    /// Show "off" for the feedback window
    Quiet,
}

impl FeedbackColors {
    /// Status colour for an outcome class
    pub fn for_class(&self, class: FeedbackClass) -> Rgb {
        match class {
            FeedbackClass::Success => self.success,
            FeedbackClass::ArgumentError => self.argument_error,
            FeedbackClass::Unrecognized => self.unrecognized,
            FeedbackClass::InternalError => self.internal_error,
            FeedbackClass::Data => self.data,
            FeedbackClass::Quiet => self.quiet,
        }
    }
}

/// What the status pixel should show after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feedback {
    /// Outcome colour for the feedback window
    Class(FeedbackClass),
    /// A colour chosen by the command itself (`pixel`, `rgb`)
    Direct(Rgb),
    /// Leave the status pixel alone (ring-only commands)
    Suppressed,
}

/// Status pixel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No command feedback showing
    Steady,
    /// Feedback showing until the deadline
    Feedback { deadline_ms: u64 },
}

/// Sole owner of the status pixel and ring
pub struct OutputArbiter<B: Board> {
    status: B::Status,
    ring: Option<RingDriver<B>>,
    rng: B::Rng,
    mode: Mode,
    /// Colour shown while steady and the heartbeat is dark
    resting: Rgb,
    shown: Rgb,
    persist: bool,
    heartbeat: Heartbeat,
    colors: FeedbackColors,
    feedback_window_ms: u32,
    last_tick_ms: Option<u64>,
}

impl<B: Board> OutputArbiter<B> {
    pub fn new(
        status: B::Status,
        ring: Option<RingPeripherals<B>>,
        rng: B::Rng,
        config: &DeviceConfig,
    ) -> Self {
        let mut arbiter = Self {
            status,
            ring: ring.map(|r| RingDriver::new(r, &config.ring)),
            rng,
            mode: Mode::Steady,
            resting: Rgb::BLACK,
            shown: Rgb::BLACK,
            persist: false,
            heartbeat: Heartbeat::new(config.heartbeat.on_ms, config.heartbeat.off_ms),
            colors: config.colors,
            feedback_window_ms: config.feedback_window_ms,
            last_tick_ms: None,
        };
        arbiter.show(Rgb::BLACK);
        arbiter
    }

    fn show(&mut self, color: Rgb) {
        self.shown = color;
        self.status.set_pixel(0, color);
        self.status.show();
    }

    pub fn status(&self) -> &B::Status {
        &self.status
    }

    /// Colour currently latched on the status pixel
    pub fn status_color(&self) -> Rgb {
        self.shown
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn colors(&self) -> &FeedbackColors {
        &self.colors
    }

    pub fn ring(&self) -> Option<&RingDriver<B>> {
        self.ring.as_ref()
    }

    /// Ring driver together with the random source it needs for theming
    pub fn ring_mut(&mut self) -> Option<(&mut RingDriver<B>, &mut B::Rng)> {
        self.ring.as_mut().map(|ring| (ring, &mut self.rng))
    }

    pub fn is_persistent(&self) -> bool {
        self.persist
    }

    pub fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }

    pub fn heartbeat_enabled(&self) -> bool {
        self.heartbeat.is_enabled()
    }

    /// Heartbeat is enabled but held off by a running theme
    pub fn heartbeat_suspended(&self) -> bool {
        self.heartbeat.is_enabled() && self.theme_running()
    }

    fn theme_running(&self) -> bool {
        self.ring.as_ref().is_some_and(|r| r.is_theming())
    }

    /// Enable or disable the heartbeat. Enabling turns persist off.
    pub fn set_heartbeat(&mut self, enabled: bool) {
        if enabled {
            self.persist = false;
        }
        if self.heartbeat.set_enabled(enabled) == Some(Beat::Fall) && self.mode == Mode::Steady {
            self.show(self.resting);
        }
    }

    /// Show command feedback, starting a new feedback window
    pub fn present(&mut self, feedback: Feedback, now_ms: u64) {
        let color = match feedback {
            Feedback::Class(class) => self.colors.for_class(class),
            Feedback::Direct(color) => color,
            Feedback::Suppressed => return,
        };
        self.show(color);
        self.mode = Mode::Feedback {
            deadline_ms: now_ms + self.feedback_window_ms as u64,
        };
    }

    /// Scheduler tick: drain pending timer flags, expire feedback, advance
    /// the heartbeat
    pub fn tick(&mut self, now_ms: u64, flags: &PendingFlags) {
        let delta_ms = match self.last_tick_ms {
            Some(last) => now_ms.saturating_sub(last).min(u32::MAX as u64) as u32,
            None => 0,
        };
        self.last_tick_ms = Some(now_ms);

        // Flags raised before a feature was disabled are still applied once.
        if flags.take(Pending::RotateDue) {
            if let Some(ring) = self.ring.as_mut() {
                ring.on_rotate_due();
            }
        }
        if flags.take(Pending::ThemeDue) {
            if let Some(ring) = self.ring.as_mut() {
                ring.on_theme_due();
            }
        }

        if let Mode::Feedback { deadline_ms } = self.mode {
            if now_ms >= deadline_ms {
                self.mode = Mode::Steady;
                if self.persist {
                    self.resting = self.shown;
                } else {
                    self.resting = Rgb::BLACK;
                    self.show(Rgb::BLACK);
                }
            }
        }

        if self.theme_running() {
            if self.heartbeat.quench().is_some() && self.mode == Mode::Steady {
                self.show(self.resting);
            }
            return;
        }

        let beat = self.heartbeat.advance(delta_ms);
        if self.mode == Mode::Steady {
            match beat {
                Some(Beat::Rise) => self.show(self.colors.heartbeat),
                Some(Beat::Fall) => self.show(self.resting),
                None => {}
            }
        }
    }
}
