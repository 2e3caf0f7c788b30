//! I2C bus parameters shared by host and target
//!
//! The peripheral behaves as a memory-mapped I2C target: the first byte of
//! every write selects a register offset, and the register file is a single
//! fixed-size buffer.

/// Default 7-bit target address of the peripheral
pub const DEFAULT_TARGET_ADDRESS: u8 = 0x47;

/// Register offset used for every transaction
pub const REGISTER_ADDRESS: u8 = 0x00;

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// 7-bit target address
    pub address: u8,
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz) at the default address
    pub const STANDARD: Self = Self {
        address: DEFAULT_TARGET_ADDRESS,
        frequency: 100_000,
    };

    /// Fast mode (400 kHz) at the default address
    pub const FAST: Self = Self {
        address: DEFAULT_TARGET_ADDRESS,
        frequency: 400_000,
    };

    /// Same bus speed, different target address
    pub const fn with_address(self, address: u8) -> Self {
        Self {
            address,
            frequency: self.frequency,
        }
    }
}
