//! Sound playback abstraction

/// Plays named sounds from an on-board catalog
pub trait AudioPlayer {
    /// Error type for playback failures
    type Error;

    /// Whether a sound with this name exists
    fn has_sound(&self, name: &str) -> bool;

    /// Names of every sound in the catalog
    fn sounds(&self) -> &[&'static str];

    /// Start playing a sound
    fn play(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Whether playback is still in progress
    fn is_playing(&self) -> bool;
}
