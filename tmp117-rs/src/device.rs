use crate::{
    Addressing, ConfigField, Configuration, ConversionCycle, ConversionMode, DeviceId, HighLimit,
    Interact, LowLimit, PresenceProbe, Temperature, Tmp117, Tmp117Error, Tmp117Result,
    apply_field,
};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// Longest payload accepted by [`Tmp117::write_registers`].
pub(crate) const MAX_WRITE_LEN: usize = 8;
/// Wait between presence probe attempts.
pub(crate) const PROBE_INTERVAL_MS: u32 = 10;

impl<I: I2c<SevenBitAddress>, D> Tmp117<I, D> {
    /// Read `buf.len()` bytes starting at register `reg`.
    ///
    /// An empty buffer is rejected before the bus is touched. Bus errors are
    /// returned as is; nothing is retried.
    pub fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Tmp117Result<(), I::Error> {
        if buf.is_empty() {
            return Err(Tmp117Error::InvalidArgument);
        }
        self.i2c.write_read(self.addr, &[reg], buf)?;
        Ok(())
    }

    /// Write `data` starting at register `reg`, in a single bus frame.
    ///
    /// Empty payloads and payloads longer than 8 bytes are rejected before the
    /// bus is touched.
    pub fn write_registers(&mut self, reg: u8, data: &[u8]) -> Tmp117Result<(), I::Error> {
        if data.is_empty() || data.len() > MAX_WRITE_LEN {
            return Err(Tmp117Error::InvalidArgument);
        }
        let mut frame = [0; MAX_WRITE_LEN + 1];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);
        self.i2c.write(self.addr, &frame[..=data.len()])?;
        Ok(())
    }

    /// Check whether the data-ready flag is set.
    ///
    /// A failed read counts as not ready.
    pub fn is_conversion_done(&mut self) -> bool {
        let mut config = Configuration::new();
        match config.read(self) {
            Ok(()) => config.data_ready(),
            Err(e) => {
                log::debug!("TMP117 data-ready check failed: {e:?}");
                false
            }
        }
    }

    /// Read the whole configuration register.
    ///
    /// Reading clears the data-ready and alert flags on the sensor.
    pub fn configuration(&mut self) -> Tmp117Result<Configuration, I::Error> {
        let mut config = Configuration::new();
        config.read(self)?;
        Ok(config)
    }

    /// Set the conversion mode.
    ///
    /// Leaves the register untouched if the mode is already selected; otherwise
    /// writes the new mode and reads it back, returning
    /// [`Verification`](Tmp117Error::Verification) on a mismatch.
    pub fn set_conversion_mode(&mut self, mode: ConversionMode) -> Tmp117Result<(), I::Error> {
        self.set_field(mode)
    }

    /// Set the conversion cycle. Same semantics as
    /// [`set_conversion_mode`](Tmp117::set_conversion_mode).
    pub fn set_conversion_cycle(&mut self, cycle: ConversionCycle) -> Tmp117Result<(), I::Error> {
        self.set_field(cycle)
    }

    pub(crate) fn set_field<F: ConfigField>(&mut self, value: F) -> Tmp117Result<(), I::Error> {
        let mut config = Configuration::new();
        config.read(self)?;
        let current = config.into_bits();
        if F::from_config(current) == value {
            return Ok(()); // already configured
        }
        let mut updated =
            Configuration::from_bits(apply_field(current, F::MASK, value.into_config()));
        updated.write(self)?;
        config.read(self)?;
        let readback = F::from_config(config.into_bits());
        if readback == value {
            log::debug!(
                "TMP117 set {value:?} ({current:#06x} -> {:#06x})",
                updated.into_bits()
            );
            Ok(())
        } else {
            log::warn!("TMP117 rejected {value:?}: read back {readback:?}");
            Err(Tmp117Error::Verification)
        }
    }

    /// Read the device ID register.
    pub fn device_id(&mut self) -> Tmp117Result<DeviceId, I::Error> {
        let mut id = DeviceId::new();
        id.read(self)?;
        Ok(id)
    }

    /// Check that the device ID register identifies a TMP117.
    pub fn verify_device_id(&mut self) -> Tmp117Result<DeviceId, I::Error> {
        let id = self.device_id()?;
        if id.is_tmp117() {
            Ok(id)
        } else {
            Err(Tmp117Error::UnknownDevice(id.into_bits()))
        }
    }

    /// Read the high limit, in degrees Celsius.
    pub fn high_limit(&mut self) -> Tmp117Result<f32, I::Error> {
        let mut limit = HighLimit::default();
        limit.read(self)?;
        Ok(limit.0.to_num())
    }

    /// Set the high limit, in degrees Celsius. Values outside the register
    /// range saturate.
    pub fn set_high_limit(&mut self, celsius: f32) -> Tmp117Result<(), I::Error> {
        HighLimit(Temperature::saturating_from_num(celsius)).write(self)
    }

    /// Read the low limit, in degrees Celsius.
    pub fn low_limit(&mut self) -> Tmp117Result<f32, I::Error> {
        let mut limit = LowLimit::default();
        limit.read(self)?;
        Ok(limit.0.to_num())
    }

    /// Set the low limit, in degrees Celsius. Values outside the register
    /// range saturate.
    pub fn set_low_limit(&mut self, celsius: f32) -> Tmp117Result<(), I::Error> {
        LowLimit(Temperature::saturating_from_num(celsius)).write(self)
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Tmp117<I, D> {
    /// Probe the sensor on the bus.
    ///
    /// Addresses the sensor up to the configured retry count, waiting 10 ms
    /// between attempts, and returns on the first success.
    ///
    /// The default [`PresenceProbe::AddressAck`] uses a zero-length write,
    /// which some Linux I2C adapters reject without touching the bus; select
    /// [`PresenceProbe::DeviceIdRead`] through
    /// [`Tmp117Builder::with_probe`](crate::Tmp117Builder::with_probe) there.
    pub fn is_present(&mut self) -> bool {
        for attempt in 0..self.retries {
            if attempt > 0 {
                self.delay.delay_ms(PROBE_INTERVAL_MS);
            }
            let answered = match self.probe {
                PresenceProbe::AddressAck => self.i2c.write(self.addr, &[]).is_ok(),
                PresenceProbe::DeviceIdRead => self
                    .i2c
                    .write_read(self.addr, &[DeviceId::ADDR], &mut [0; 2])
                    .is_ok(),
            };
            if answered {
                log::debug!(
                    "TMP117 at {:#04x} ready after {} attempt(s)",
                    self.addr,
                    attempt + 1
                );
                return true;
            }
        }
        log::warn!(
            "TMP117 at {:#04x} did not respond to {} probes",
            self.addr,
            self.retries
        );
        false
    }

    /// Probe the sensor and record whether it is available.
    ///
    /// With the ID check enabled, the device ID register must also identify
    /// a TMP117.
    pub fn init(&mut self) -> bool {
        self.available = self.is_present();
        if self.available && self.check_id {
            if let Err(e) = self.verify_device_id() {
                log::warn!("TMP117 at {:#04x} failed the ID check: {e:?}", self.addr);
                self.available = false;
            }
        }
        self.available
    }
}
