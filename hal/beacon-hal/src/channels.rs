//! Dimmable LED channel outputs

/// A bank of independently dimmable LED outputs
pub trait LedChannels {
    /// Number of channels in the bank
    fn channel_count(&self) -> usize;

    /// Drive channel `index` (0-based) at `level` (0.0..=1.0)
    fn set_brightness(&mut self, index: usize, level: f32);
}
