//! Periodic timer tasks
//!
//! Each task waits for a rate from its [`SignalTimer`](crate::board::SignalTimer)
//! and then raises its pending flag at that rate until told otherwise.
//! Nothing else happens here.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};

use beacon_core::Pending;
use beacon_hal::timer::period_us;

use crate::channels::{PENDING, ROTATE_RATE, THEME_RATE};

async fn run_timer(rate: &'static Signal<CriticalSectionRawMutex, Option<u32>>, pending: Pending) {
    let mut hz = None;
    loop {
        hz = match hz {
            None => rate.wait().await,
            Some(hz) => {
                let mut ticker = Ticker::every(Duration::from_micros(period_us(hz)));
                loop {
                    match select(ticker.next(), rate.wait()).await {
                        Either::First(()) => PENDING.raise(pending),
                        Either::Second(next) => break next,
                    }
                }
            }
        };
        debug!("{:?} timer now {:?} Hz", pending, hz);
    }
}

#[embassy_executor::task]
pub async fn rotate_timer_task() {
    run_timer(&ROTATE_RATE, Pending::RotateDue).await
}

#[embassy_executor::task]
pub async fn theme_timer_task() {
    run_timer(&THEME_RATE, Pending::ThemeDue).await
}
