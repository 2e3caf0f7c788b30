//! Timestamp text formats
//!
//! `time set` takes a compact `YYYYMMDD-HHMMSS` stamp; `time get` answers
//! in ISO-8601 form.

use core::fmt::Write;

use beacon_hal::DateTime;
use heapless::String;

/// Length of `YYYY-MM-DDTHH:MM:SS`
pub const ISO_LEN: usize = 19;

fn digits<T: core::str::FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse `YYYYMMDD-HHMMSS`, rejecting out-of-range fields
pub fn parse_timestamp(text: &str) -> Option<DateTime> {
    let (date, time) = text.split_once('-')?;
    if date.len() != 8 || time.len() != 6 {
        return None;
    }
    let datetime = DateTime {
        year: digits(date.get(0..4)?)?,
        month: digits(date.get(4..6)?)?,
        day: digits(date.get(6..8)?)?,
        hour: digits(time.get(0..2)?)?,
        minute: digits(time.get(2..4)?)?,
        second: digits(time.get(4..6)?)?,
    };
    datetime.is_valid().then_some(datetime)
}

/// Format as `YYYY-MM-DDTHH:MM:SS`
pub fn format_iso(datetime: &DateTime) -> String<ISO_LEN> {
    let mut out = String::new();
    // Fits for any four-digit year.
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        datetime.year, datetime.month, datetime.day, datetime.hour, datetime.minute, datetime.second
    );
    out
}
