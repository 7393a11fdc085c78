use crate::{
    ConversionCycle, ConversionMode, Interact, Temperature, TemperatureResult, Tmp117,
    Tmp117Error, Tmp117Result,
};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// Returned by [`Tmp117::get_temperature`] when no valid reading exists.
///
/// Lies outside the sensor's measurement range; it is a marker, not a temperature.
pub const UNAVAILABLE_TEMPERATURE: f32 = -255.0;

/// Mode and cycle forced before every reading: continuous conversion with
/// 8 averaged samples every 125 ms.
const ACQUISITION_MODE: ConversionMode = ConversionMode::Continuous;
const ACQUISITION_CYCLE: ConversionCycle = ConversionCycle::Ms125;

impl<I: I2c<SevenBitAddress>, D: DelayNs> Tmp117<I, D> {
    /// Measure the temperature in degrees Celsius.
    ///
    /// Forces continuous conversion with the 125 ms cycle, waits for the
    /// data-ready flag and reads the result register. The result is read even
    /// if the flag never came up within the poll budget, in which case the
    /// previous sample is returned.
    ///
    /// Never fails: returns [`UNAVAILABLE_TEMPERATURE`] if the sensor was not
    /// found at initialization (without touching the bus) or if the result
    /// register could not be read. Use [`read_temperature`](Tmp117::read_temperature)
    /// to get the error instead.
    pub fn get_temperature(&mut self) -> f32 {
        if !self.available {
            return UNAVAILABLE_TEMPERATURE;
        }
        if let Err(e) = self.set_conversion_mode(ACQUISITION_MODE) {
            log::warn!("TMP117 conversion mode not applied: {e:?}");
        }
        if let Err(e) = self.set_conversion_cycle(ACQUISITION_CYCLE) {
            log::warn!("TMP117 conversion cycle not applied: {e:?}");
        }
        self.wait_for_conversion();
        match self.read_result() {
            Ok(temp) => temp.to_num(),
            Err(e) => {
                log::warn!("TMP117 result read failed: {e:?}");
                UNAVAILABLE_TEMPERATURE
            }
        }
    }

    /// Measure the temperature in degrees Celsius, reporting failures.
    ///
    /// Same sequence as [`get_temperature`](Tmp117::get_temperature), but
    /// an unavailable sensor, a failed configuration step or a failed result
    /// read is returned as an error.
    pub fn read_temperature(&mut self) -> Tmp117Result<f32, I::Error> {
        if !self.available {
            return Err(Tmp117Error::Unavailable);
        }
        self.set_conversion_mode(ACQUISITION_MODE)?;
        self.set_conversion_cycle(ACQUISITION_CYCLE)?;
        self.wait_for_conversion();
        Ok(self.read_result()?.to_num())
    }

    /// Poll the data-ready flag until it is set or the poll budget runs out.
    ///
    /// Returns whether a new result is available.
    pub fn wait_for_conversion(&mut self) -> bool {
        for trial in 0..self.poll_trials {
            if trial > 0 {
                self.delay.delay_ms(self.poll_interval_ms);
            }
            if self.is_conversion_done() {
                return true;
            }
        }
        log::debug!(
            "TMP117 data not ready after {} polls, reading previous sample",
            self.poll_trials
        );
        false
    }

    fn read_result(&mut self) -> Tmp117Result<Temperature, I::Error> {
        let mut result = TemperatureResult::default();
        result.read(self)?;
        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::UNAVAILABLE_TEMPERATURE;
    use crate::mock::*;
    use crate::{Tmp117, Tmp117Builder, Tmp117Error};

    fn read_result(bytes: [u8; 2]) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0x00], bytes.to_vec())
    }

    #[test]
    fn unavailable_returns_sentinel_without_bus_traffic() {
        let mut dev = Tmp117::new(I2cMock::new(&[]), NoopDelay::new());
        assert_eq!(dev.get_temperature(), -255.0);
        assert_eq!(dev.get_temperature(), UNAVAILABLE_TEMPERATURE);
        assert!(matches!(
            dev.read_temperature(),
            Err(Tmp117Error::Unavailable)
        ));
        done(dev);
    }

    #[test]
    fn first_reading_configures_sensor() {
        let mut dev = available(&[
            read_config(0x0220),
            read_config(0x0220),
            write_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x20a0),
            read_result([0x01, 0x90]),
        ]);
        assert_eq!(dev.get_temperature(), 3.125);
        done(dev);
    }

    #[test]
    fn configured_sensor_reads_negative() {
        let mut dev = available(&[
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x20a0),
            read_result([0xff, 0x00]),
        ]);
        assert_eq!(dev.get_temperature(), -2.0);
        done(dev);
    }

    #[test]
    fn continuous_mode_forced_from_shutdown() {
        let mut dev = available(&[
            read_config(0x04a0),
            write_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x20a0),
            read_result([0x0c, 0x80]),
        ]);
        assert_eq!(dev.read_temperature().unwrap(), 25.0);
        done(dev);
    }

    #[test]
    fn poll_budget_exhausted_reads_anyway() {
        let mut dev = available(&[
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_result([0x80, 0x00]),
        ]);
        dev.poll_trials = 3;
        assert_eq!(dev.get_temperature(), -256.0);
        done(dev);
    }

    #[test]
    fn builder_poll_settings() {
        let dev = Tmp117Builder::default()
            .with_poll_trials(3)
            .with_poll_interval_ms(20)
            .build(I2cMock::new(&[I2cTransaction::write(ADDR, vec![])]), NoopDelay::new());
        assert_eq!((dev.poll_trials, dev.poll_interval_ms), (3, 20));
        done(dev);
    }

    #[test]
    fn setter_failure_does_not_abort_reading() {
        let mut dev = available(&[
            read_config(0x04a0),
            write_config(0x00a0),
            read_config(0x04a0),
            read_config(0x04a0),
            read_config(0x24a0),
            read_result([0x01, 0x90]),
        ]);
        assert_eq!(dev.get_temperature(), 3.125);
        done(dev);
    }

    #[test]
    fn strict_reading_reports_verification_failure() {
        let mut dev = available(&[
            read_config(0x04a0),
            write_config(0x00a0),
            read_config(0x04a0),
        ]);
        assert!(matches!(
            dev.read_temperature(),
            Err(Tmp117Error::Verification)
        ));
        done(dev);
    }

    #[test]
    fn result_read_failure_degrades_to_sentinel() {
        let mut dev = available(&[
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x20a0),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0, 0]).with_error(ErrorKind::Other),
        ]);
        assert_eq!(dev.get_temperature(), UNAVAILABLE_TEMPERATURE);
        done(dev);
    }
}
