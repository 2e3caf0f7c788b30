//! System control

/// Processor-level control
pub trait SystemControl {
    /// Reset the microcontroller. On hardware this does not return.
    fn reset(&mut self);
}
