//! Host transport against a simulated peripheral
//!
//! The simulated bus feeds the core's `DeviceTransport` the way the
//! firmware's I2C task does, and the simulated delay runs the firmware's
//! 1 ms scheduler tick, so settle and spacing delays behave as on hardware.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use beacon_core::color;
use beacon_core::testing::{board, MockBoard, MockBoardOptions};
use beacon_core::verbs::SAMPLE_DATA;
use beacon_core::{Device, DeviceConfig, DeviceTransport, Lifecycle, PendingFlags};
use beacon_hal::i2c::DEFAULT_TARGET_ADDRESS;
use beacon_hal::Rgb;
use beacon_host::{HostTransport, ProtocolError, Requester, TransportConfig, TransportError};
use beacon_protocol::{FrameError, Response};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

struct Sim {
    transport: DeviceTransport,
    device: Device<MockBoard>,
    flags: PendingFlags,
    lifecycle: Lifecycle,
    now_ms: u64,
    bus_writes: usize,
    register: u8,
}

impl Sim {
    fn step(&mut self) {
        self.now_ms += 1;
        let now = self.now_ms;
        self.device.tick(now, &self.flags, &mut self.lifecycle);
        let device = &mut self.device;
        self.transport
            .poll(|cmd| Ok::<_, Infallible>(device.process(cmd, now)));
    }
}

type Shared = Rc<RefCell<Sim>>;

struct SimBus(Shared);

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        if address != DEFAULT_TARGET_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut sim = self.0.borrow_mut();
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    sim.bus_writes += 1;
                    if let Some(&register) = bytes.first() {
                        sim.register = register;
                    }
                    if sim.transport.bus_write(bytes) > 0 {
                        sim.transport.on_end_write();
                    }
                }
                Operation::Read(buf) => {
                    let register = sim.register;
                    sim.transport.bus_read(register, buf);
                }
            }
        }
        Ok(())
    }
}

struct SimDelay(Shared);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns.div_ceil(1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut sim = self.0.borrow_mut();
        for _ in 0..ms {
            sim.step();
        }
    }
}

fn simulate(options: MockBoardOptions) -> Shared {
    Rc::new(RefCell::new(Sim {
        transport: DeviceTransport::new(),
        device: Device::new(board(options), DeviceConfig::default(), 0),
        flags: PendingFlags::new(),
        lifecycle: Lifecycle::new(),
        now_ms: 0,
        bus_writes: 0,
        register: 0,
    }))
}

fn connect(sim: &Shared, config: TransportConfig) -> HostTransport<SimBus, SimDelay> {
    let mut host = HostTransport::new(SimBus(sim.clone()), SimDelay(sim.clone()), config);
    host.enable().unwrap();
    host
}

fn quiet() -> TransportConfig {
    TransportConfig {
        set_time_on_enable: false,
        ..Default::default()
    }
}

#[test]
fn test_ping_round_trip() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = connect(&sim, quiet());
    assert_eq!(host.request("ping").unwrap(), Some(Response::Pong));
    assert_eq!(host.request("data").unwrap().unwrap().body(), SAMPLE_DATA);
}

#[test]
fn test_rgb_lights_ring_and_stops_heartbeat() {
    let sim = simulate(MockBoardOptions::ring());
    let mut host = connect(&sim, quiet());
    assert_eq!(host.request("heartbeat on").unwrap(), Some(Response::Ack));
    assert_eq!(host.request("rgb 1 10 20 30").unwrap(), Some(Response::Ack));

    let sim = sim.borrow();
    let output = sim.device.controller().output();
    let ring = output.ring().unwrap();
    assert_eq!(ring.strip().last(0), Rgb::new(10, 20, 30));
    assert!(!output.heartbeat_enabled());
}

#[test]
fn test_unknown_verb_shows_then_clears() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = connect(&sim, quiet());
    assert_eq!(host.request("frobnicate").unwrap(), Some(Response::Nack));
    assert_eq!(
        sim.borrow().device.controller().output().status_color(),
        color::ORANGE
    );

    SimDelay(sim.clone()).delay_ms(1000);
    assert_eq!(
        sim.borrow().device.controller().output().status_color(),
        color::BLACK
    );
}

#[test]
fn test_empty_command_not_sent() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = connect(&sim, quiet());
    assert_eq!(host.request("").unwrap(), None);
    assert_eq!(sim.borrow().bus_writes, 0);
}

#[test]
fn test_enable_sets_clock() {
    let sim = simulate(MockBoardOptions::ring());
    let mut host = connect(&sim, TransportConfig::default());
    let response = host.request("time get").unwrap().unwrap();
    let stamp = response.body();
    assert_eq!(stamp.len(), 19);
    assert!(stamp.starts_with("20"));
    assert_eq!(&stamp[10..11], "T");
}

#[test]
fn test_reading_too_early_is_stale() {
    let sim = simulate(MockBoardOptions::bare());
    let early = TransportConfig {
        settle_ms: 0,
        ..quiet()
    };
    let mut host = connect(&sim, early);
    assert_eq!(host.request("ping"), Ok(None));
    // the spacing delay let the tick catch up
    assert_eq!(
        sim.borrow().transport.buffer_snapshot()[..6],
        [4, 0, b'P', b'I', b'N', b'G']
    );

    let mut host = connect(
        &sim,
        TransportConfig {
            fail_on_protocol_error: true,
            ..early
        },
    );
    assert_eq!(
        host.request("data"),
        Err(TransportError::Protocol(ProtocolError::Stale))
    );
}

#[test]
fn test_longest_command_is_processed() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = connect(
        &sim,
        TransportConfig {
            fail_on_protocol_error: true,
            ..quiet()
        },
    );
    let longest = format!("ping {}", "x".repeat(54));
    assert_eq!(host.request(&longest), Ok(Some(Response::Pong)));

    let writes = sim.borrow().bus_writes;
    let too_long = format!("ping {}", "x".repeat(55));
    assert_eq!(
        host.request(&too_long),
        Err(TransportError::Protocol(ProtocolError::InvalidCommand(
            FrameError::InvalidLength
        )))
    );
    assert_eq!(sim.borrow().bus_writes, writes);
}

#[test]
fn test_wrong_address_is_bus_error() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = HostTransport::new(
        SimBus(sim.clone()),
        SimDelay(sim.clone()),
        TransportConfig {
            address: 0x20,
            ..quiet()
        },
    );
    host.enable().unwrap();
    assert_eq!(
        host.request("ping"),
        Err(TransportError::Bus(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    );
}

#[test]
fn test_disabled_transport_refuses() {
    let sim = simulate(MockBoardOptions::bare());
    let mut host = connect(&sim, quiet());
    host.disable();
    assert_eq!(host.request("ping"), Err(TransportError::Disabled));
}
