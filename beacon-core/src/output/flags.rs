//! Pending flags raised from timer context
//!
//! A periodic timer callback may only raise one of these flags. The
//! scheduler tick takes (reads and clears) each flag and does the real work,
//! so output state is never touched from interrupt context.

use portable_atomic::{AtomicBool, Ordering};

/// Work requested by a periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pending {
    /// Shift the ring by one position
    RotateDue,
    /// Advance the theme pulsation by one step
    ThemeDue,
}

/// Set of pending flags shared between timer callbacks and the scheduler tick
#[derive(Debug, Default)]
pub struct PendingFlags {
    rotate_due: AtomicBool,
    theme_due: AtomicBool,
}

impl PendingFlags {
    /// All flags clear
    pub const fn new() -> Self {
        Self {
            rotate_due: AtomicBool::new(false),
            theme_due: AtomicBool::new(false),
        }
    }

    fn slot(&self, pending: Pending) -> &AtomicBool {
        match pending {
            Pending::RotateDue => &self.rotate_due,
            Pending::ThemeDue => &self.theme_due,
        }
    }

    /// Raise a flag. Safe to call from interrupt context.
    pub fn raise(&self, pending: Pending) {
        self.slot(pending).store(true, Ordering::Release);
    }

    /// Read and clear a flag
    pub fn take(&self, pending: Pending) -> bool {
        self.slot(pending).swap(false, Ordering::AcqRel)
    }

    /// Read a flag without clearing it
    pub fn is_raised(&self, pending: Pending) -> bool {
        self.slot(pending).load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears() {
        let flags = PendingFlags::new();
        flags.raise(Pending::RotateDue);
        assert!(flags.is_raised(Pending::RotateDue));
        assert!(!flags.is_raised(Pending::ThemeDue));

        assert!(flags.take(Pending::RotateDue));
        assert!(!flags.take(Pending::RotateDue));
    }

    #[test]
    fn test_repeated_raises_coalesce() {
        let flags = PendingFlags::new();
        flags.raise(Pending::ThemeDue);
        flags.raise(Pending::ThemeDue);
        assert!(flags.take(Pending::ThemeDue));
        assert!(!flags.take(Pending::ThemeDue));
    }
}
