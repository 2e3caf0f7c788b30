//! Periodic hardware timer abstraction
//!
//! Timer callbacks run in interrupt context. Implementations must only raise
//! a pending flag there; the scheduler tick does the actual work.

/// A restartable periodic timer
pub trait PeriodicTimer {
    /// (Re)start the timer at `hz` ticks per second
    fn start(&mut self, hz: u32);

    /// Stop the timer; no further ticks are raised
    fn stop(&mut self);

    /// Whether the timer is currently running
    fn is_running(&self) -> bool;
}

/// Tick period in microseconds for a rate of `hz`. A zero rate is treated
/// as 1 Hz.
pub const fn period_us(hz: u32) -> u64 {
    let hz = if hz == 0 { 1 } else { hz };
    1_000_000 / hz as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_us() {
        assert_eq!(period_us(1), 1_000_000);
        assert_eq!(period_us(24), 41_666);
        assert_eq!(period_us(0), 1_000_000);
    }
}
