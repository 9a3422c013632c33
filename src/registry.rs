//! Device table backed by a [`RecordStore`]
//!
//! Only the compact [`DeviceRecord`] is persisted. The scaling constants in
//! [`DeviceDetail`] are rebuilt from it on every load, and the most recently
//! used device is kept in a single-entry cache so repeated reads of the same
//! device never touch the store.

use crate::calibration::{self, Calibration, CalibrationParams};
use crate::record::{DeviceRecord, RECORD_SIZE};
use crate::store::RecordStore;
use crate::variant::{Scale, Variant};
use crate::{Error, MAX_DEVICES};

/// Everything the driver needs to talk to one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceDetail {
    /// Persisted state
    pub record: DeviceRecord,
    /// Scaling constants derived from the record
    pub calibration: Calibration,
}

impl DeviceDetail {
    /// Derive the full detail from a persisted record
    #[must_use]
    pub fn new(record: DeviceRecord) -> Self {
        let params = CalibrationParams {
            max_amps: record.max_amps,
            shunt_micro_ohms: record.shunt_micro_ohms,
        };
        Self {
            record,
            calibration: calibration::compute(record.variant, params),
        }
    }

    /// Chip variant
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.record.variant
    }

    /// I2C address
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.record.address
    }

    /// Bus voltage register of this device (or channel)
    #[must_use]
    pub fn bus_register(&self) -> u8 {
        self.variant().info().bus_register + self.variant().register_offset()
    }

    /// Shunt voltage register of this device (or channel)
    #[must_use]
    pub fn shunt_register(&self) -> u8 {
        self.variant().info().shunt_register + self.variant().register_offset()
    }

    /// Current register, if the device has one
    #[must_use]
    pub fn current_register(&self) -> Option<u8> {
        self.variant().info().current_register
    }

    /// Power register, if the device has one
    #[must_use]
    pub fn power_register(&self) -> Option<u8> {
        self.variant().info().power_register
    }

    /// Bus voltage LSB (raw count to mV)
    #[must_use]
    pub fn bus_scale(&self) -> Scale {
        self.variant().info().bus_scale
    }

    /// Shunt voltage LSB (raw count to µV)
    #[must_use]
    pub fn shunt_scale(&self) -> Scale {
        self.variant().info().shunt_scale
    }
}

/// Device table with a single-entry cache
pub struct Registry<S> {
    store: S,
    count: u8,
    capacity: u8,
    cached: Option<(u8, DeviceDetail)>,
}

impl<S> Registry<S>
where
    S: RecordStore,
{
    /// Create an empty registry on top of `store`
    ///
    /// Capacity is the number of whole records the store holds, at most 255.
    pub fn new(store: S) -> Self {
        let capacity = (store.capacity() / RECORD_SIZE).min(MAX_DEVICES) as u8;
        Self {
            store,
            count: 0,
            capacity,
            cached: None,
        }
    }

    /// Number of devices in the table
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Maximum number of devices the store can hold
    pub const fn capacity(&self) -> u8 {
        self.capacity
    }

    /// No further devices can be added
    pub const fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Load device `index`
    ///
    /// The last loaded or stored device is served from memory.
    ///
    /// # Errors
    ///
    /// * `UnknownDevice` if `index` is not in the table
    /// * `Storage` if the store read fails
    /// * `CorruptRecord` if the stored bytes do not decode
    pub fn load<E>(&mut self, index: u8) -> Result<DeviceDetail, Error<E, S::Error>> {
        if index >= self.count {
            return Err(Error::UnknownDevice(index));
        }
        if let Some((cached_index, detail)) = self.cached {
            if cached_index == index {
                return Ok(detail);
            }
        }

        let mut bytes = [0u8; RECORD_SIZE];
        self.store
            .read(usize::from(index) * RECORD_SIZE, &mut bytes)
            .map_err(Error::Storage)?;
        let record = DeviceRecord::decode(&bytes).ok_or(Error::CorruptRecord(index))?;
        let detail = DeviceDetail::new(record);

        self.cached = Some((index, detail));
        Ok(detail)
    }

    /// Persist the record part of `detail` as device `index`
    ///
    /// # Errors
    ///
    /// * `UnknownDevice` if `index` is not in the table
    /// * `Storage` if the store write fails
    pub fn store<E>(&mut self, index: u8, detail: &DeviceDetail) -> Result<(), Error<E, S::Error>> {
        if index >= self.count {
            return Err(Error::UnknownDevice(index));
        }
        self.write_record(index, detail)
    }

    /// Append a device to the table
    ///
    /// Returns the new index, or `None` when the table is full.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store write fails; the table is left unchanged
    pub fn push<E>(&mut self, detail: &DeviceDetail) -> Result<Option<u8>, Error<E, S::Error>> {
        if self.is_full() {
            return Ok(None);
        }
        let index = self.count;
        self.write_record(index, detail)?;
        self.count += 1;
        Ok(Some(index))
    }

    /// Consume the registry and return the store
    pub fn release(self) -> S {
        self.store
    }

    fn write_record<E>(&mut self, index: u8, detail: &DeviceDetail) -> Result<(), Error<E, S::Error>> {
        self.store
            .write(usize::from(index) * RECORD_SIZE, &detail.record.encode())
            .map_err(Error::Storage)?;
        self.cached = Some((index, *detail));
        Ok(())
    }
}
