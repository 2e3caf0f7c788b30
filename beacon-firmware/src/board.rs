//! Pico board collaborators
//!
//! Status pixel on GPIO16, 24-pixel ring on GPIO15, RP2040 RTC. No LED
//! channels, audio or distance sensor are fitted.

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime as RtcDateTime, DayOfWeek, Rtc, RtcError};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use rand::rngs::SmallRng;
use smart_leds::RGB8;

use beacon_core::Board;
use beacon_hal::{Absent, DateTime, PeriodicTimer, PixelStrip, RealTimeClock, Rgb, SystemControl};

/// Pixel buffer whose `show` hands a copy to a flush task
pub struct FrameStrip<const N: usize> {
    pixels: [RGB8; N],
    flush: &'static Signal<CriticalSectionRawMutex, [RGB8; N]>,
}

impl<const N: usize> FrameStrip<N> {
    pub const fn new(flush: &'static Signal<CriticalSectionRawMutex, [RGB8; N]>) -> Self {
        Self {
            pixels: [RGB8 { r: 0, g: 0, b: 0 }; N],
            flush,
        }
    }
}

impl<const N: usize> PixelStrip for FrameStrip<N> {
    fn len(&self) -> usize {
        N
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = RGB8 {
                r: color.r,
                g: color.g,
                b: color.b,
            };
        }
    }

    fn show(&mut self) {
        // Latest frame wins if the flush task is behind
        self.flush.signal(self.pixels);
    }
}

/// Periodic timer backed by a timer task listening on `rate`
pub struct SignalTimer {
    rate: &'static Signal<CriticalSectionRawMutex, Option<u32>>,
    running: bool,
}

impl SignalTimer {
    pub const fn new(rate: &'static Signal<CriticalSectionRawMutex, Option<u32>>) -> Self {
        Self {
            rate,
            running: false,
        }
    }
}

impl PeriodicTimer for SignalTimer {
    fn start(&mut self, hz: u32) {
        self.running = hz > 0;
        self.rate.signal((hz > 0).then_some(hz));
    }

    fn stop(&mut self) {
        self.running = false;
        self.rate.signal(None);
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// On-chip real-time clock
pub struct PicoRtc {
    rtc: Rtc<'static, RTC>,
}

impl PicoRtc {
    pub fn new(rtc: Rtc<'static, RTC>) -> Self {
        Self { rtc }
    }
}

impl RealTimeClock for PicoRtc {
    type Error = RtcError;

    fn now(&mut self) -> Result<DateTime, RtcError> {
        let now = self.rtc.now()?;
        Ok(DateTime {
            year: now.year,
            month: now.month,
            day: now.day,
            hour: now.hour,
            minute: now.minute,
            second: now.second,
        })
    }

    fn set(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        self.rtc.set_datetime(RtcDateTime {
            year: datetime.year,
            month: datetime.month,
            day: datetime.day,
            day_of_week: day_of_week(datetime.year, datetime.month, datetime.day),
            hour: datetime.hour,
            minute: datetime.minute,
            second: datetime.second,
        })
    }
}

/// Sakamoto's method; `month` is 1-based
fn day_of_week(year: u16, month: u8, day: u8) -> DayOfWeek {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let month = month.clamp(1, 12);
    let y = if month < 3 { year.saturating_sub(1) } else { year };
    let index = (y + y / 4 - y / 100 + y / 400 + OFFSETS[month as usize - 1] + day as u16) % 7;
    match index {
        0 => DayOfWeek::Sunday,
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        _ => DayOfWeek::Saturday,
    }
}

/// System reset through the Cortex-M SCB
pub struct CortexReset;

impl SystemControl for CortexReset {
    fn reset(&mut self) {
        cortex_m::peripheral::SCB::sys_reset();
    }
}

/// The Pico carrier board
pub struct PicoBoard;

impl Board for PicoBoard {
    type Status = FrameStrip<{ crate::channels::STATUS_LEN }>;
    type Ring = FrameStrip<{ crate::channels::RING_LEN }>;
    type Timer = SignalTimer;
    type Channels = Absent;
    type Audio = Absent;
    type Clock = PicoRtc;
    type Sensor = Absent;
    type System = CortexReset;
    type Rng = SmallRng;
}
