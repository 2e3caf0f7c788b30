//! Distance sensor abstraction

/// A range finder reporting distance in millimetres
pub trait DistanceSensor {
    /// Error type for sensor reads
    type Error;

    fn read_distance(&mut self) -> Result<u16, Self::Error>;
}
