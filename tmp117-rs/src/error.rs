#[derive(Debug)]
/// TMP117 errors.
pub enum Tmp117Error<E> {
    /// I2C bus errors, including transport timeouts.
    I2c(E),
    /// Empty or oversized register buffer. Raised before the bus is touched.
    InvalidArgument,
    /// A configuration write was accepted but the read-back did not match.
    Verification,
    /// The sensor was never confirmed present on the bus.
    Unavailable,
    /// The device ID register did not identify a TMP117.
    UnknownDevice(u16),
}

impl<E> From<E> for Tmp117Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
