//! Real-time clock abstraction

/// Calendar date and time of day (no timezone, no sub-seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Field ranges check; does not reject e.g. February 30th
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

/// A settable wall clock
pub trait RealTimeClock {
    /// Error type for clock access
    type Error;

    /// Current date and time
    fn now(&mut self) -> Result<DateTime, Self::Error>;

    /// Set the clock
    fn set(&mut self, datetime: DateTime) -> Result<(), Self::Error>;
}
