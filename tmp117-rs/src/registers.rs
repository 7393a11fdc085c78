use crate::{Tmp117, Tmp117Error, Tmp117Result, traits::ConfigField};
use crate::{Addressing, Interact};
use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use fixed::types::I9F7;

pub(crate) const TEMP_RESULT_REG: u8 = 0x00;
pub(crate) const CONFIG_REG: u8 = 0x01;
pub(crate) const HIGH_LIMIT_REG: u8 = 0x02;
pub(crate) const LOW_LIMIT_REG: u8 = 0x03;
pub(crate) const DEVICE_ID_REG: u8 = 0x0f;

/// Device ID field reported by a TMP117.
pub(crate) const TMP117_DEVICE_ID: u16 = 0x117;

/// Temperature in degrees Celsius, as a two's complement word with 7 fractional
/// bits (0.0078125 °C per LSB).
pub type Temperature = I9F7;

/// Replace the bits selected by `mask` in `current` with those of `value`.
///
/// Bits outside the mask are kept. `value` must already be positioned in the
/// register; bits of `value` outside the mask are ignored.
pub const fn apply_field(current: u16, mask: u16, value: u16) -> u16 {
    (current & !mask) | (value & mask)
}

/// Conversion mode, bits 11:10 of the configuration register.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Continuous conversion (power-on default).
    #[default]
    Continuous = 0b00,
    /// Shutdown: no conversions, lowest supply current.
    Shutdown = 0b01,
    /// Continuous conversion, alternate encoding.
    ContinuousAlt = 0b10,
    /// Single conversion, then shutdown.
    OneShot = 0b11,
}

impl ConversionMode {
    const fn into_bits(self) -> u8 {
        self as _
    }

    const fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::Continuous,
            0b01 => Self::Shutdown,
            0b10 => Self::ContinuousAlt,
            _ => Self::OneShot,
        }
    }
}

impl ConfigField for ConversionMode {
    const MASK: u16 = 0b11 << 10;

    fn into_config(self) -> u16 {
        (self.into_bits() as u16) << 10
    }

    fn from_config(config: u16) -> Self {
        Self::from_bits(((config & Self::MASK) >> 10) as u8)
    }
}

/// Conversion cycle, bits 9:7 of the configuration register.
///
/// Names give the standby cycle without averaging. With averaging enabled the
/// cycle stretches to at least the averaging time:
///
/// | CONV | AVG = 00 | AVG = 01 | AVG = 10 | AVG = 11 |
/// |------|----------|----------|----------|----------|
/// | 000  | 15.5 ms  | 125 ms   | 500 ms   | 1 s      |
/// | 001  | 125 ms   | 125 ms   | 500 ms   | 1 s      |
/// | 010  | 250 ms   | 250 ms   | 500 ms   | 1 s      |
/// | 011  | 500 ms   | 500 ms   | 500 ms   | 1 s      |
/// | 100  | 1 s      | 1 s      | 1 s      | 1 s      |
/// | 101  | 4 s      | 4 s      | 4 s      | 4 s      |
/// | 110  | 8 s      | 8 s      | 8 s      | 8 s      |
/// | 111  | 16 s     | 16 s     | 16 s     | 16 s     |
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionCycle {
    /// 15.5 ms.
    Ms15_5 = 0b000,
    /// 125 ms. With the power-on 8-sample averaging this is the
    /// "8 samples every 125 ms" setting used for temperature reads.
    Ms125 = 0b001,
    /// 250 ms.
    Ms250 = 0b010,
    /// 500 ms.
    Ms500 = 0b011,
    /// 1 s (power-on default).
    #[default]
    S1 = 0b100,
    /// 4 s.
    S4 = 0b101,
    /// 8 s.
    S8 = 0b110,
    /// 16 s.
    S16 = 0b111,
}

impl ConversionCycle {
    const fn into_bits(self) -> u8 {
        self as _
    }

    const fn from_bits(value: u8) -> Self {
        use ConversionCycle::*;
        match value & 0b111 {
            0b000 => Ms15_5,
            0b001 => Ms125,
            0b010 => Ms250,
            0b011 => Ms500,
            0b100 => S1,
            0b101 => S4,
            0b110 => S8,
            _ => S16,
        }
    }
}

impl ConfigField for ConversionCycle {
    const MASK: u16 = 0b111 << 7;

    fn into_config(self) -> u16 {
        (self.into_bits() as u16) << 7
    }

    fn from_config(config: u16) -> Self {
        Self::from_bits(((config & Self::MASK) >> 7) as u8)
    }
}

/// # Configuration register
///
/// Controls the conversion mode, conversion cycle, averaging and alert
/// behavior, and reports the data-ready and alert flags. The data-ready
/// and alert flags are cleared by the sensor when the register is read.
///
/// After a reset the register reads `0x0220`: continuous conversion,
/// 1 s cycle, 8-sample averaging.
#[bitfield(u16)]
pub struct Configuration {
    #[bits(1)]
    __: u8,
    /// Writing 1 triggers a soft reset. Always reads 0.
    pub soft_reset: bool,
    /// ALERT pin reflects the data-ready flag instead of the alert flags.
    pub dr_alert: bool,
    /// ALERT pin is active high.
    pub polarity: bool,
    /// Therm mode instead of alert mode.
    pub therm_mode: bool,
    /// Averaging: 0 none, 1 = 8, 2 = 32, 3 = 64 samples.
    #[bits(2)]
    pub averaging: u8,
    /// Conversion cycle.
    #[bits(3)]
    pub conversion_cycle: ConversionCycle,
    /// Conversion mode.
    #[bits(2)]
    pub conversion_mode: ConversionMode,
    /// EEPROM busy flag.
    pub eeprom_busy: bool,
    /// Data-ready flag, set when a conversion has completed.
    pub data_ready: bool,
    /// Low alert flag.
    pub low_alert: bool,
    /// High alert flag.
    pub high_alert: bool,
}

impl Interact for Configuration {
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        let mut buf = [0; 2];
        dev.read_registers(Self::ADDR, &mut buf)?;
        *self = Self::from_bits(u16::from_be_bytes(buf));
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        dev.write_registers(Self::ADDR, &self.into_bits().to_be_bytes())
    }
}

impl Addressing for Configuration {
    const ADDR: u8 = CONFIG_REG;
}

/// Temperature result register. Reads -256 °C until the first conversion
/// after reset has completed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TemperatureResult(pub Temperature);

impl TemperatureResult {
    /// The sample in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        self.0.to_num()
    }
}

impl Addressing for TemperatureResult {
    const ADDR: u8 = TEMP_RESULT_REG;
}

impl Interact for TemperatureResult {
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        self.0 = read_temperature_word(dev, Self::ADDR)?;
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        _dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        Err(Tmp117Error::InvalidArgument)
    }
}

/// High limit register, compared against the result in alert and therm modes.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HighLimit(pub Temperature);

impl Addressing for HighLimit {
    const ADDR: u8 = HIGH_LIMIT_REG;
}

impl Interact for HighLimit {
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        self.0 = read_temperature_word(dev, Self::ADDR)?;
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        dev.write_registers(Self::ADDR, &self.0.to_be_bytes())
    }
}

/// Low limit register, compared against the result in alert mode.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LowLimit(pub Temperature);

impl Addressing for LowLimit {
    const ADDR: u8 = LOW_LIMIT_REG;
}

impl Interact for LowLimit {
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        self.0 = read_temperature_word(dev, Self::ADDR)?;
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        dev.write_registers(Self::ADDR, &self.0.to_be_bytes())
    }
}

/// Device ID register.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct DeviceId {
    /// Device ID, 0x117 for the TMP117.
    #[bits(12)]
    pub device_id: u16,
    /// Silicon revision.
    #[bits(4)]
    pub revision: u8,
}

impl DeviceId {
    /// Whether the register identifies a TMP117.
    pub fn is_tmp117(&self) -> bool {
        self.device_id() == TMP117_DEVICE_ID
    }
}

impl Addressing for DeviceId {
    const ADDR: u8 = DEVICE_ID_REG;
}

impl Interact for DeviceId {
    fn read<I: I2c<SevenBitAddress>, D>(
        &mut self,
        dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        let mut buf = [0; 2];
        dev.read_registers(Self::ADDR, &mut buf)?;
        *self = Self::from_bits(u16::from_be_bytes(buf));
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D>(
        &mut self,
        _dev: &mut Tmp117<I, D>,
    ) -> Tmp117Result<(), I::Error> {
        Err(Tmp117Error::InvalidArgument)
    }
}

fn read_temperature_word<I: I2c<SevenBitAddress>, D>(
    dev: &mut Tmp117<I, D>,
    reg: u8,
) -> Tmp117Result<Temperature, I::Error> {
    let mut buf = [0; 2];
    dev.read_registers(reg, &mut buf)?;
    Ok(Temperature::from_be_bytes(buf))
}
