//! Bus interface implementations for the INA family
//!
//! All devices share one I2C bus, so unlike a single-chip driver the interface
//! carries a *selected* address that the driver switches before every register
//! access. Register transfers go through the `device-driver`
//! [`RegisterInterface`] trait; [`Bus`] adds the few operations the scan and
//! the facade need on top of it.

use crate::I2C_DELAY_US;
use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

/// I2C bus clock rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusSpeed {
    /// 100 kHz
    Standard,
    /// 400 kHz
    Fast,
    /// 1 MHz
    FastPlus,
    /// 3.4 MHz
    HighSpeed,
}

impl BusSpeed {
    /// Clock rate in Hz
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Self::Standard => 100_000,
            Self::Fast => 400_000,
            Self::FastPlus => 1_000_000,
            Self::HighSpeed => 3_400_000,
        }
    }
}

/// Register access to whichever device is currently selected on a shared bus
pub trait Bus: RegisterInterface<AddressType = u8> {
    /// Direct subsequent register accesses to `address`
    fn select(&mut self, address: u8);

    /// Check whether a device acknowledges at `address`
    ///
    /// Does not change the selected address.
    fn acknowledges(&mut self, address: u8) -> bool;

    /// Change the bus clock
    ///
    /// # Errors
    ///
    /// Returns the bus error if the controller rejects the new rate
    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error>;
}

/// Hook used to reconfigure the controller clock, `embedded-hal` has no API for it
pub type ClockHook<I2C, E> = fn(&mut I2C, u32) -> Result<(), E>;

/// I2C interface for a bus populated with INA devices
pub struct I2cInterface<I2C, D, E> {
    i2c: I2C,
    delay: D,
    address: u8,
    clock: Option<ClockHook<I2C, E>>,
}

impl<I2C, D, E> I2cInterface<I2C, D, E> {
    /// Create a new I2C interface
    ///
    /// The delay is used for the settling time after every transaction.
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::new(i2c, delay);
    /// let mut ina = InaDriver::new(interface, RamStore::<60>::new());
    /// ```
    pub const fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: crate::FIRST_DEVICE_ADDRESS,
            clock: None,
        }
    }

    /// Install a hook that reprograms the controller clock on `set_speed`
    ///
    /// Without a hook, speed changes are accepted and ignored.
    #[must_use]
    pub fn with_clock_hook(mut self, hook: ClockHook<I2C, E>) -> Self {
        self.clock = Some(hook);
        self
    }

    /// Consume the interface and return the I2C peripheral and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D, E> RegisterInterface for I2cInterface<I2C, D, E>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
    D: DelayNs,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        let result = self.i2c.write_read(self.address, &[address], read_data);
        self.delay.delay_us(I2C_DELAY_US);
        result
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len() for I2C
        // Registers are at most 16 bits wide
        let mut buffer = [0u8; 3];
        buffer[0] = address;
        let len = write_data.len().min(2);
        buffer[1..=len].copy_from_slice(&write_data[..len]);

        let result = self.i2c.write(self.address, &buffer[..=len]);
        self.delay.delay_us(I2C_DELAY_US);
        result
    }
}

impl<I2C, D, E> Bus for I2cInterface<I2C, D, E>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
    D: DelayNs,
{
    fn select(&mut self, address: u8) {
        self.address = address;
    }

    fn acknowledges(&mut self, address: u8) -> bool {
        let acked = self.i2c.write(address, &[]).is_ok();
        self.delay.delay_us(I2C_DELAY_US);
        acked
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error> {
        if let Some(hook) = self.clock {
            hook(&mut self.i2c, speed.hz())?;
        }
        Ok(())
    }
}

/// Read a 16-bit big-endian register from the selected device
pub(crate) fn read_word<B: Bus>(bus: &mut B, register: u8) -> Result<u16, B::Error> {
    let mut data = [0u8; 2];
    bus.read_register(register, 16, &mut data)?;
    Ok(u16::from_be_bytes(data))
}
