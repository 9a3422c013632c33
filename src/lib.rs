#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod alert;
pub mod calibration;
pub mod device;
pub mod identify;
pub mod interface;
pub mod record;
pub mod registers;
pub mod registry;
pub mod store;
pub mod timing;
pub mod variant;

// Re-export main types
pub use alert::AlertKind;
pub use calibration::{Calibration, CalibrationParams, ProgrammableGain};
pub use device::{DriverConfig, InaDriver, ScanConfig, Target};
pub use interface::{Bus, BusSpeed, I2cInterface};
pub use record::{DeviceRecord, OperatingMode, RECORD_SIZE};
pub use registry::{DeviceDetail, Registry};
pub use store::{RamStore, RamStoreError, RecordStore};
pub use variant::{Channel, Scale, Variant};

/// Lowest I2C address an INA2xx/INA3221 can be strapped to
pub const FIRST_DEVICE_ADDRESS: u8 = 0x40;

/// Highest I2C address an INA2xx can be strapped to
pub const LAST_DEVICE_ADDRESS: u8 = 0x4F;

/// Hard upper bound on the device table (indices must fit in a byte)
pub const MAX_DEVICES: usize = 255;

/// Largest bus current (A) a record can hold
pub const MAX_BUS_AMPS: u16 = 1022;

/// Largest shunt resistance (µΩ) a record can hold
pub const MAX_SHUNT_MICRO_OHMS: u32 = 0x000F_FFFF;

/// Settling delay after every bus transaction, in microseconds
pub const I2C_DELAY_US: u32 = 10;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E, S> {
    /// Communication error on the bus
    Bus(E),
    /// Error reported by the record store
    Storage(S),
    /// Device index is not in the device table
    UnknownDevice(u8),
    /// Stored record could not be decoded (contains the device index)
    CorruptRecord(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Device did not report a finished conversion in time (contains the device index)
    ConversionTimeout(u8),
}

impl<E, S> From<E> for Error<E, S> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
