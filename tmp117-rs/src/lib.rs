#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/*! # TMP117
 *
 * A driver for the Texas Instruments TMP117 digital temperature sensor,
 * built on the [`embedded-hal`](embedded_hal) 1.0 I2C and delay traits.
 *
 * The driver probes the sensor on the bus, configures its conversion
 * mode and cycle through read-modify-write-verify sequences on the
 * configuration register, polls the data-ready flag and converts the
 * result register into degrees Celsius.
 */

mod device;
mod error;
mod registers;
#[cfg(feature = "embassy-sync")]
mod shared;
mod temperature;
mod traits;

pub use error::Tmp117Error;
pub use registers::{
    Configuration, ConversionCycle, ConversionMode, DeviceId, HighLimit, LowLimit, Temperature,
    TemperatureResult, apply_field,
};
#[cfg(feature = "embassy-sync")]
pub use shared::SharedTmp117;
pub use temperature::UNAVAILABLE_TEMPERATURE;
pub use traits::{Addressing, ConfigField, Interact};

/// Results of TMP117-specific function calls.
pub type Tmp117Result<T, E> = Result<T, Tmp117Error<E>>;

/// I2C address of the TMP117, selected by the ADD0 pin strap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// ADD0 tied to GND (0x48).
    #[default]
    Gnd,
    /// ADD0 tied to V+ (0x49).
    Vplus,
    /// ADD0 tied to SDA (0x4A).
    Sda,
    /// ADD0 tied to SCL (0x4B).
    Scl,
}

impl From<Address> for u8 {
    fn from(addr: Address) -> Self {
        match addr {
            Address::Gnd => 0x48,
            Address::Vplus => 0x49,
            Address::Sda => 0x4a,
            Address::Scl => 0x4b,
        }
    }
}

impl TryFrom<u8> for Address {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Address::*;
        match value {
            0x48 => Ok(Gnd),
            0x49 => Ok(Vplus),
            0x4a => Ok(Sda),
            0x4b => Ok(Scl),
            _ => Err("Invalid TMP117 address"),
        }
    }
}

/// How [`Tmp117::is_present`] addresses the sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PresenceProbe {
    /// Zero-length write: succeeds when the sensor acknowledges its address.
    ///
    /// Some Linux adapters (those flagged `I2C_AQ_NO_ZERO_LEN_WRITE`, e.g.
    /// several USB bridges) refuse zero-length writes outright, so the sensor
    /// never appears present. Use [`DeviceIdRead`](PresenceProbe::DeviceIdRead)
    /// on those buses.
    #[default]
    AddressAck,
    /// Two-byte read of the device ID register. Only the transfer has to
    /// succeed; the contents are checked by the ID check, if enabled.
    DeviceIdRead,
}

/// A TMP117 temperature sensor.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal::i2c::I2c) trait)
/// and a timer object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
/// Pass `&mut bus` to keep using the bus elsewhere once the driver is dropped.
pub struct Tmp117<I, D> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) delay: D,
    pub(crate) retries: u8,
    pub(crate) probe: PresenceProbe,
    pub(crate) poll_trials: u8,
    pub(crate) poll_interval_ms: u32,
    pub(crate) check_id: bool,
    pub(crate) available: bool,
}

impl<I, D> Tmp117<I, D> {
    /// Creates a new instance of `Tmp117` with the default configuration.
    ///
    /// The sensor is not probed; call [`init`](Tmp117::init) before reading
    /// temperatures, or use [`Tmp117Builder::build`].
    pub fn new(i2c: I, delay: D) -> Self {
        Tmp117Builder::default().assemble(i2c, delay)
    }

    /// Whether the last presence probe found the sensor.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// The 7-bit bus address in use.
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Release the I2C bus and the delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

/// Builder for creating a [`Tmp117`] instance with custom configuration.
#[derive(Debug, Clone)]
pub struct Tmp117Builder {
    pub(crate) addr: Address,
    pub(crate) retries: u8,
    pub(crate) probe: PresenceProbe,
    pub(crate) poll_trials: u8,
    pub(crate) poll_interval_ms: u32,
    pub(crate) check_id: bool,
}

impl Default for Tmp117Builder {
    fn default() -> Self {
        Tmp117Builder {
            addr: Address::default(),
            retries: 100,
            probe: PresenceProbe::default(),
            poll_trials: 50,
            poll_interval_ms: 10,
            check_id: false,
        }
    }
}

impl Tmp117Builder {
    /// Sets the bus address.
    pub fn with_address(mut self, addr: Address) -> Self {
        self.addr = addr;
        self
    }

    /// Sets the number of attempts made by the presence probe.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Sets how the presence probe addresses the sensor.
    pub fn with_probe(mut self, probe: PresenceProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Sets how many times the data-ready flag is polled per reading.
    pub fn with_poll_trials(mut self, trials: u8) -> Self {
        self.poll_trials = trials;
        self
    }

    /// Sets the sleep between data-ready polls, in milliseconds.
    pub fn with_poll_interval_ms(mut self, interval: u32) -> Self {
        self.poll_interval_ms = interval;
        self
    }

    /// Require the device ID register to identify a TMP117 during initialization,
    /// in addition to the bus acknowledging its address.
    pub fn with_id_check(mut self, check: bool) -> Self {
        self.check_id = check;
        self
    }

    /// Builds a new `Tmp117` instance and probes the sensor.
    ///
    /// The driver is always returned; check [`Tmp117::is_available`] to find out
    /// whether the sensor answered.
    pub fn build<I: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(
        self,
        i2c: I,
        delay: D,
    ) -> Tmp117<I, D> {
        let mut dev = self.assemble(i2c, delay);
        dev.init();
        dev
    }

    fn assemble<I, D>(self, i2c: I, delay: D) -> Tmp117<I, D> {
        Tmp117 {
            i2c,
            addr: self.addr.into(),
            delay,
            retries: self.retries,
            probe: self.probe,
            poll_trials: self.poll_trials,
            poll_interval_ms: self.poll_interval_ms,
            check_id: self.check_id,
            available: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    pub use embedded_hal::i2c::ErrorKind;
    pub use embedded_hal_mock::eh1::delay::NoopDelay;
    pub use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    pub const ADDR: u8 = 0x48;

    pub type MockTmp117 = crate::Tmp117<I2cMock, NoopDelay>;

    /// Driver over a mock bus, marked available without probing.
    pub fn available(expectations: &[I2cTransaction]) -> MockTmp117 {
        let mut dev = crate::Tmp117::new(I2cMock::new(expectations), NoopDelay::new());
        dev.available = true;
        dev
    }

    pub fn done(dev: MockTmp117) {
        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    pub fn read_config(value: u16) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0x01], value.to_be_bytes().to_vec())
    }

    pub fn write_config(value: u16) -> I2cTransaction {
        let [hi, lo] = value.to_be_bytes();
        I2cTransaction::write(ADDR, vec![0x01, hi, lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::*;

    #[test]
    fn builder_probes_sensor() {
        let i2c = I2cMock::new(&[I2cTransaction::write(0x4a, vec![])]);
        let dev = Tmp117Builder::default()
            .with_address(Address::Sda)
            .build(i2c, NoopDelay::new());
        assert!(dev.is_available());
        assert_eq!(dev.address(), 0x4a);
        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn new_is_unprobed() {
        let dev = Tmp117::new(I2cMock::new(&[]), NoopDelay::new());
        assert!(!dev.is_available());
        assert_eq!(dev.address(), ADDR);
        done(dev);
    }

    #[test]
    fn address_strap_round_trip() {
        for addr in [Address::Gnd, Address::Vplus, Address::Sda, Address::Scl] {
            assert_eq!(Address::try_from(u8::from(addr)), Ok(addr));
        }
        assert!(Address::try_from(0x18).is_err());
    }
}
