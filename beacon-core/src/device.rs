//! Scheduler-facing device facade
//!
//! [`Device`] ties the verb table, the deferred queue and the controller
//! together. The firmware's tick task calls [`Device::tick`] and then hands
//! [`Device::process`] to [`DeviceTransport::poll`](crate::DeviceTransport::poll).

use beacon_protocol::{Command, Response};

use crate::board::{Board, Peripherals};
use crate::config::{Capabilities, DeviceConfig};
use crate::controller::Controller;
use crate::dispatch::Dispatcher;
use crate::output::{Feedback, PendingFlags};
use crate::queue::DeferredQueue;
use crate::verbs::verb_table;

/// Run-loop lifecycle, owned by the top-level loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lifecycle {
    enabled: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop the run loop after the current tick
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

pub struct Device<B: Board> {
    controller: Controller<B>,
    dispatcher: Dispatcher<Controller<B>>,
    queue: DeferredQueue<Controller<B>>,
    last_tick_ms: u64,
}

impl<B: Board> Device<B> {
    /// Build the controller and verb table, then show the boot colour
    pub fn new(peripherals: Peripherals<B>, config: DeviceConfig, now_ms: u64) -> Self {
        let caps = peripherals.capabilities();
        info!(
            "device: ring {} channels {} audio {} clock {} sensor {}",
            caps.ring_len,
            caps.channel_count,
            caps.audio,
            caps.clock,
            caps.sensor
        );
        let mut controller = Controller::new(peripherals, config, now_ms);
        controller
            .output_mut()
            .present(Feedback::Direct(config.colors.boot), now_ms);
        Self {
            controller,
            dispatcher: verb_table(&caps),
            queue: DeferredQueue::new(),
            last_tick_ms: now_ms,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.controller.capabilities()
    }

    pub fn controller(&self) -> &Controller<B> {
        &self.controller
    }

    pub fn dispatcher(&self) -> &Dispatcher<Controller<B>> {
        &self.dispatcher
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Handle one command and show its feedback. Never fails.
    pub fn process(&mut self, command: &Command, now_ms: u64) -> Response {
        self.controller.set_now(now_ms);
        let reply = self
            .dispatcher
            .dispatch(&mut self.controller, &mut self.queue, command);
        debug!("'{}' -> {}", command.as_str(), reply.response.body());
        self.controller
            .output_mut()
            .present(reply.feedback, now_ms);
        reply.response
    }

    /// One scheduler tick: drain pending output flags, expire feedback,
    /// advance heartbeat and channels, start delayed services, run one
    /// deferred entry, and perform a requested reset.
    pub fn tick(&mut self, now_ms: u64, flags: &PendingFlags, lifecycle: &mut Lifecycle) {
        if !lifecycle.is_enabled() {
            return;
        }
        let delta_ms = now_ms.saturating_sub(self.last_tick_ms).min(u32::MAX as u64) as u32;
        self.last_tick_ms = now_ms;
        self.controller.set_now(now_ms);

        self.controller.output_mut().tick(now_ms, flags);
        self.controller.tick_channels(delta_ms);
        self.controller.start_services_if_due(now_ms);
        self.queue.run_next(&mut self.controller);

        if self.controller.reset_if_due(now_ms) {
            lifecycle.disable();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::output::{Mode, Pending};
    use crate::testing::{board, MockBoard, MockBoardOptions};
    use beacon_hal::Rgb;

    fn device(options: MockBoardOptions) -> Device<MockBoard> {
        Device::new(board(options), DeviceConfig::default(), 0)
    }

    fn cmd(text: &str) -> Command {
        Command::parse(text).unwrap()
    }

    fn run(device: &mut Device<MockBoard>, flags: &PendingFlags, from: u64, to: u64) {
        let mut lifecycle = Lifecycle::new();
        for t in from..=to {
            device.tick(t, flags, &mut lifecycle);
        }
    }

    #[test]
    fn test_boot_colour_then_dark() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::bare());
        assert_eq!(dev.controller().output().status_color(), color::CYAN);
        run(&mut dev, &flags, 1, 1000);
        assert_eq!(dev.controller().output().status_color(), Rgb::BLACK);
    }

    #[test]
    fn test_unknown_verb_feedback_window() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::bare());
        run(&mut dev, &flags, 1, 1000);
        assert_eq!(dev.process(&cmd("frobnicate"), 2000), Response::Nack);
        assert_eq!(dev.controller().output().status_color(), color::ORANGE);
        run(&mut dev, &flags, 2001, 2999);
        assert_eq!(dev.controller().output().status_color(), color::ORANGE);
        run(&mut dev, &flags, 3000, 3000);
        assert_eq!(dev.controller().output().status_color(), Rgb::BLACK);
    }

    #[test]
    fn test_persist_then_pixel_never_reverts() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::bare());
        dev.process(&cmd("persist on"), 0);
        dev.process(&cmd("pixel red"), 10);
        run(&mut dev, &flags, 11, 5000);
        assert_eq!(dev.controller().output().status_color(), color::RED);
        assert_eq!(dev.controller().output().mode(), Mode::Steady);
    }

    #[test]
    fn test_heartbeat_autostarts() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::bare());
        run(&mut dev, &flags, 1, 6999);
        assert!(!dev.controller().output().heartbeat_enabled());
        run(&mut dev, &flags, 7000, 7000);
        assert!(dev.controller().output().heartbeat_enabled());
        assert!(dev.controller().services_started());
    }

    #[test]
    fn test_deferred_runs_on_tick() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::full());
        assert_eq!(dev.process(&cmd("play chime"), 0), Response::Ack);
        assert_eq!(dev.queued(), 1);
        assert!(dev.controller().audio().unwrap().played().is_empty());
        run(&mut dev, &flags, 1, 1);
        assert_eq!(dev.queued(), 0);
        assert_eq!(dev.controller().audio().unwrap().played(), ["chime"]);
    }

    #[test]
    fn test_reset_disables_lifecycle() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::bare());
        let mut lifecycle = Lifecycle::new();
        assert_eq!(dev.process(&cmd("reset"), 50), Response::Ack);
        dev.tick(149, &flags, &mut lifecycle);
        assert!(lifecycle.is_enabled());
        dev.tick(150, &flags, &mut lifecycle);
        assert!(!lifecycle.is_enabled());
        assert_eq!(dev.controller().system().resets(), 1);

        // a disabled lifecycle stops further ticks
        dev.tick(10_000, &flags, &mut lifecycle);
        assert!(!dev.controller().services_started());
    }

    #[test]
    fn test_theme_ticks_keep_active_count() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::full());
        assert_eq!(dev.process(&cmd("theme pixels 12"), 0), Response::Ack);
        dev.process(&cmd("theme on"), 0);
        let mut lifecycle = Lifecycle::new();
        for t in 1..=50 {
            flags.raise(Pending::ThemeDue);
            dev.tick(t, &flags, &mut lifecycle);
        }
        let model = dev.controller().output().ring().unwrap().model();
        assert_eq!(model.active_count(), 12);
        assert!(model
            .pixels()
            .iter()
            .filter(|p| !p.is_active())
            .all(|p| p.color == Rgb::BLACK));
    }

    #[test]
    fn test_channels_follow_tick() {
        let flags = PendingFlags::new();
        let mut dev = device(MockBoardOptions::full());
        dev.process(&cmd("ch2 on"), 0);
        run(&mut dev, &flags, 1, 2);
        let outputs = dev.controller().channels().unwrap().outputs();
        assert_eq!(outputs.level(1), 0.3);
        assert_eq!(outputs.level(2), 0.0);
    }
}
