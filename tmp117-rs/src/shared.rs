use crate::{ConversionCycle, ConversionMode, Tmp117, Tmp117Result};
use core::cell::RefCell;
use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

/// A [`Tmp117`] that can be shared between execution contexts.
///
/// Register sequences (read, write, read back) are not atomic on the bus, so
/// every operation runs with the handle's own lock held from the first transfer
/// to the last, including the data-ready poll delays.
///
/// The raw mutex `M` picks what the lock excludes:
/// [`NoopRawMutex`](embassy_sync::blocking_mutex::raw::NoopRawMutex) for a
/// single executor, [`ThreadModeRawMutex`](embassy_sync::blocking_mutex::raw::ThreadModeRawMutex)
/// for thread mode only, and
/// [`CriticalSectionRawMutex`](embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex)
/// when interrupts also use the sensor. The latter keeps interrupts masked for
/// a whole reading, so the delay must not rely on them.
pub struct SharedTmp117<M: RawMutex, I, D> {
    inner: Mutex<M, RefCell<Tmp117<I, D>>>,
}

impl<M: RawMutex, I, D> SharedTmp117<M, I, D> {
    /// Wrap a driver.
    pub const fn new(dev: Tmp117<I, D>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(dev)),
        }
    }

    /// Run `f` with exclusive access to the driver.
    ///
    /// # Panics
    /// If called re-entrantly from within `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Tmp117<I, D>) -> R) -> R {
        self.inner.lock(|dev| f(&mut dev.borrow_mut()))
    }

    /// Unwrap the driver.
    pub fn into_inner(self) -> Tmp117<I, D> {
        self.inner.into_inner().into_inner()
    }
}

impl<M: RawMutex, I: I2c<SevenBitAddress>, D: DelayNs> SharedTmp117<M, I, D> {
    /// See [`Tmp117::get_temperature`].
    pub fn get_temperature(&self) -> f32 {
        self.lock(|dev| dev.get_temperature())
    }

    /// See [`Tmp117::set_conversion_mode`].
    pub fn set_conversion_mode(&self, mode: ConversionMode) -> Tmp117Result<(), I::Error> {
        self.lock(|dev| dev.set_conversion_mode(mode))
    }

    /// See [`Tmp117::set_conversion_cycle`].
    pub fn set_conversion_cycle(&self, cycle: ConversionCycle) -> Tmp117Result<(), I::Error> {
        self.lock(|dev| dev.set_conversion_cycle(cycle))
    }
}

#[cfg(test)]
mod tests {
    use super::SharedTmp117;
    use crate::ConversionMode;
    use crate::mock::*;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
    use std::{
        sync::mpsc,
        thread,
        time::{Duration, Instant},
    };

    #[test]
    fn operations_run_under_lock() {
        let shared: SharedTmp117<CriticalSectionRawMutex, _, _> = SharedTmp117::new(available(&[
            read_config(0x00a0),
            write_config(0x04a0),
            read_config(0x04a0),
            read_config(0x04a0),
            write_config(0x00a0),
            read_config(0x00a0),
            read_config(0x00a0),
            read_config(0x20a0),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x01, 0x90]),
        ]));
        shared.set_conversion_mode(ConversionMode::Shutdown).unwrap();
        assert_eq!(shared.get_temperature(), 3.125);
        assert!(shared.lock(|dev| dev.is_available()));
        done(shared.into_inner());
    }

    #[test]
    fn handles_lock_independently() {
        let a: SharedTmp117<NoopRawMutex, _, _> = SharedTmp117::new(available(&[]));
        let b: SharedTmp117<NoopRawMutex, _, _> = SharedTmp117::new(available(&[]));
        let (locked, is_locked) = mpsc::channel();
        let holder = thread::spawn(move || {
            a.lock(|_| {
                locked.send(()).unwrap();
                thread::sleep(Duration::from_millis(400));
            });
            a
        });
        is_locked.recv().unwrap();
        let start = Instant::now();
        assert!(b.lock(|dev| dev.is_available()));
        assert!(start.elapsed() < Duration::from_millis(200));
        done(holder.join().unwrap().into_inner());
        done(b.into_inner());
    }
}
