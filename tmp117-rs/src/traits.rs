use crate::{Tmp117, Tmp117Result};
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Address of a register in the TMP117 register map.
pub trait Addressing {
    /// Register pointer for reads and writes.
    const ADDR: u8;
}

/// Trait for moving a register value between the host and the TMP117.
pub trait Interact: Addressing {
    /// Read the register value from the TMP117.
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error>;
    /// Write the register value to the TMP117.
    ///
    /// Read-only registers reject the write with
    /// [`InvalidArgument`](crate::Tmp117Error::InvalidArgument).
    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error>;
}

/// A bit-field of the configuration register.
///
/// Values are positioned in the register (already shifted), so a field
/// value can be combined with the raw register through [`MASK`](ConfigField::MASK).
pub trait ConfigField: Copy + PartialEq + core::fmt::Debug {
    /// Bits of the configuration register covered by the field.
    const MASK: u16;
    /// Field value positioned in the register.
    fn into_config(self) -> u16;
    /// Extract the field from a raw configuration register value.
    fn from_config(config: u16) -> Self;
}
