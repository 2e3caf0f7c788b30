//! Heartbeat flash timing
//!
//! Driven entirely by scheduler tick deltas: a short flash every few
//! seconds. The heartbeat only reports edges; the arbiter decides what the
//! status pixel shows.

/// Edge reported by [`Heartbeat::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Beat {
    /// Flash starts
    Rise,
    /// Flash ends
    Fall,
}

/// Heartbeat state
#[derive(Debug, Clone)]
pub struct Heartbeat {
    enabled: bool,
    lit: bool,
    elapsed_ms: u32,
    on_ms: u32,
    off_ms: u32,
}

impl Heartbeat {
    /// A disabled heartbeat with the given flash and gap durations
    pub fn new(on_ms: u32, off_ms: u32) -> Self {
        Self {
            enabled: false,
            lit: false,
            elapsed_ms: 0,
            on_ms,
            off_ms,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the flash is currently showing
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Enable or disable. Disabling a lit heartbeat reports the falling edge.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<Beat> {
        if self.enabled == enabled {
            return None;
        }
        self.enabled = enabled;
        self.elapsed_ms = 0;
        if !enabled {
            return self.quench();
        }
        None
    }

    /// End a flash early without changing the enabled state
    pub fn quench(&mut self) -> Option<Beat> {
        if self.lit {
            self.lit = false;
            self.elapsed_ms = 0;
            Some(Beat::Fall)
        } else {
            None
        }
    }

    /// Advance by `delta_ms`, returning an edge if one occurred
    pub fn advance(&mut self, delta_ms: u32) -> Option<Beat> {
        if !self.enabled {
            return None;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.lit {
            if self.elapsed_ms >= self.on_ms {
                self.lit = false;
                self.elapsed_ms = 0;
                return Some(Beat::Fall);
            }
        } else if self.elapsed_ms >= self.off_ms {
            self.lit = true;
            self.elapsed_ms = 0;
            return Some(Beat::Rise);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_beats() {
        let mut hb = Heartbeat::new(50, 2950);
        assert_eq!(hb.advance(10_000), None);
    }

    #[test]
    fn test_flash_cycle() {
        let mut hb = Heartbeat::new(50, 2950);
        hb.set_enabled(true);

        assert_eq!(hb.advance(2900), None);
        assert_eq!(hb.advance(50), Some(Beat::Rise));
        assert!(hb.is_lit());
        assert_eq!(hb.advance(49), None);
        assert_eq!(hb.advance(1), Some(Beat::Fall));
        assert!(!hb.is_lit());
    }

    #[test]
    fn test_disable_while_lit_reports_fall() {
        let mut hb = Heartbeat::new(50, 100);
        hb.set_enabled(true);
        assert_eq!(hb.advance(100), Some(Beat::Rise));
        assert_eq!(hb.set_enabled(false), Some(Beat::Fall));
        assert!(!hb.is_enabled());
        assert!(!hb.is_lit());
    }
}
