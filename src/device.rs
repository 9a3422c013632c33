//! High-level driver API for INA power monitors
//!
//! [`InaDriver`] owns the shared I2C bus and the record store. Devices are
//! addressed by their index in the device table, which is filled by the bus
//! scan in [`InaDriver::begin`]. Setters take a [`Target`] so one call can
//! reconfigure every device at once.
//!
//! # Example
//!
//! ```ignore
//! let interface = I2cInterface::new(i2c, delay);
//! let mut ina = InaDriver::new(interface, RamStore::<96>::new());
//!
//! let found = ina.begin(CalibrationParams::new(1, 100_000)?, Target::All)?;
//! for index in 0..found {
//!     let mv = ina.bus_millivolts(index)?;
//!     let ua = ina.bus_microamps(index)?;
//! }
//! ```

use core::ops::Range;

use crate::alert::AlertKind;
use crate::calibration::{CalibrationParams, INA219_BRNG, INA219_LOW_RANGE_MV};
use crate::interface::{self, Bus, BusSpeed};
use crate::record::{DeviceRecord, OperatingMode};
use crate::registers::{config_fields, config_word, InaRegisters as RegisterDevice};
use crate::registry::{DeviceDetail, Registry};
use crate::store::RecordStore;
use crate::timing::{self, FieldUpdate};
use crate::variant::{reg, ReadyFlag, Variant};
use crate::{Error, FIRST_DEVICE_ADDRESS, LAST_DEVICE_ADDRESS};

/// Longest INA226 conversion: 1024 averages of 8.244 ms bus and shunt conversions
pub const DEFAULT_CONVERSION_TIMEOUT_US: u32 = 17_000_000;

/// Default interval between conversion ready polls
pub const DEFAULT_POLL_INTERVAL_US: u32 = 1_000;

/// Devices an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Every device in the table
    All,
    /// A single device by table index
    Device(u8),
}

impl From<u8> for Target {
    fn from(index: u8) -> Self {
        Self::Device(index)
    }
}

/// Address range covered by the bus scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanConfig {
    /// First address scanned
    pub first_address: u8,
    /// Last address scanned (inclusive)
    pub last_address: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            first_address: FIRST_DEVICE_ADDRESS,
            last_address: LAST_DEVICE_ADDRESS,
        }
    }
}

impl ScanConfig {
    /// Create a scan range
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the range is empty or leaves 7-bit addressing
    pub const fn new(first_address: u8, last_address: u8) -> Result<Self, Error<(), ()>> {
        if first_address > last_address || last_address > 0x7F {
            return Err(Error::InvalidConfig);
        }
        Ok(Self {
            first_address,
            last_address,
        })
    }
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Bus scan range
    pub scan: ScanConfig,
    /// Give up waiting for a conversion after this long (µs)
    pub conversion_timeout_us: u32,
    /// Delay between conversion ready polls (µs)
    pub poll_interval_us: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            conversion_timeout_us: DEFAULT_CONVERSION_TIMEOUT_US,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }
}

/// Main driver for a bus of INA devices
pub struct InaDriver<I, S> {
    pub(crate) device: RegisterDevice<I>,
    pub(crate) registry: Registry<S>,
    pub(crate) config: DriverConfig,
}

impl<I, S> InaDriver<I, S>
where
    I: Bus,
    S: RecordStore,
{
    /// Create a driver with the default configuration
    ///
    /// Nothing is sent on the bus until [`begin`](Self::begin).
    pub fn new(interface: I, store: S) -> Self {
        Self::with_config(interface, store, DriverConfig::default())
    }

    /// Create a driver with a custom configuration
    pub fn with_config(interface: I, store: S, config: DriverConfig) -> Self {
        Self {
            device: RegisterDevice::new(interface),
            registry: Registry::new(store),
            config,
        }
    }

    /// Discover devices, or re-initialise known ones
    ///
    /// With an empty table the configured address range is scanned and every
    /// recognised device is calibrated for `params` (`target` is ignored).
    /// Otherwise no scan takes place and the targeted devices are recalibrated.
    ///
    /// Returns the number of devices in the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails, or if re-initialising a known
    /// device fails on the bus. Bus errors while scanning only skip the
    /// offending address.
    pub fn begin(
        &mut self,
        params: CalibrationParams,
        target: Target,
    ) -> Result<u8, Error<I::Error, S::Error>> {
        if self.registry.count() == 0 {
            let _found = self.scan(params)?;
            #[cfg(feature = "defmt")]
            defmt::info!("INA: {=u8} device(s) registered", _found);
        } else {
            for index in self.targets(target)? {
                let detail = self.detail(index)?;
                let record = DeviceRecord::new(
                    detail.variant(),
                    detail.address(),
                    params.max_amps,
                    params.shunt_micro_ohms,
                );
                self.initialize(index, DeviceDetail::new(record))?;
            }
        }
        Ok(self.registry.count())
    }

    /// Number of devices in the table
    pub const fn device_count(&self) -> u8 {
        self.registry.count()
    }

    /// Driver configuration
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Change the I2C clock rate
    ///
    /// # Errors
    ///
    /// Returns an error if the bus controller rejects the rate.
    pub fn set_i2c_speed(&mut self, speed: BusSpeed) -> Result<(), Error<I::Error, S::Error>> {
        self.device.interface.set_speed(speed)?;
        Ok(())
    }

    /// Chip variant of a device
    ///
    /// # Errors
    ///
    /// Returns `UnknownDevice` for an index outside the table, or a store error.
    pub fn variant(&mut self, index: u8) -> Result<Variant, Error<I::Error, S::Error>> {
        Ok(self.detail(index)?.variant())
    }

    /// Part name of a device, e.g. `"INA226"`
    ///
    /// # Errors
    ///
    /// Returns `UnknownDevice` for an index outside the table, or a store error.
    pub fn device_name(&mut self, index: u8) -> Result<&'static str, Error<I::Error, S::Error>> {
        Ok(self.variant(index)?.name())
    }

    /// I2C address of a device
    ///
    /// # Errors
    ///
    /// Returns `UnknownDevice` for an index outside the table, or a store error.
    pub fn device_address(&mut self, index: u8) -> Result<u8, Error<I::Error, S::Error>> {
        Ok(self.detail(index)?.address())
    }

    /// Record and derived scaling constants of a device
    ///
    /// # Errors
    ///
    /// Returns `UnknownDevice` for an index outside the table, or a store error.
    pub fn detail(&mut self, index: u8) -> Result<DeviceDetail, Error<I::Error, S::Error>> {
        self.registry.load(index)
    }

    /// Set the operating mode
    ///
    /// The mode is remembered in the device record so reads in a triggered
    /// mode can start the next conversion. The INA3221 channels share one
    /// configuration register, so setting the mode of one channel sets it
    /// for all three.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    /// When the record cannot be stored the previous mode is put back on the
    /// device.
    pub fn set_mode(
        &mut self,
        target: Target,
        mode: OperatingMode,
    ) -> Result<(), Error<I::Error, S::Error>> {
        for index in self.targets(target)? {
            let detail = self.select(index)?;
            let previous = self.device.configuration().read()?.mode();
            self.device.configuration().modify(|w| {
                w.set_mode(mode.bits());
            })?;

            if let Err(e) = self.store_mode(index, detail, mode) {
                self.device.configuration().modify(|w| {
                    w.set_mode(previous);
                })?;
                self.store_mode(index, detail, detail.record.mode)?;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Operating mode last set on a device
    ///
    /// # Errors
    ///
    /// Returns `UnknownDevice` for an index outside the table, or a store error.
    pub fn mode(&mut self, index: u8) -> Result<OperatingMode, Error<I::Error, S::Error>> {
        Ok(self.detail(index)?.record.mode)
    }

    /// Average this many samples per reading (rounded down to a supported count)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    pub fn set_averaging(
        &mut self,
        target: Target,
        samples: u16,
    ) -> Result<(), Error<I::Error, S::Error>> {
        self.update_config(target, |variant| {
            timing::averaging(variant.info().layout, samples)
        })
    }

    /// Bus voltage conversion time (rounded down to a supported time)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    pub fn set_bus_conversion(
        &mut self,
        target: Target,
        micros: u32,
    ) -> Result<(), Error<I::Error, S::Error>> {
        self.update_config(target, |variant| {
            timing::bus_conversion(variant.info().layout, micros)
        })
    }

    /// Shunt voltage conversion time (rounded down to a supported time)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    pub fn set_shunt_conversion(
        &mut self,
        target: Target,
        micros: u32,
    ) -> Result<(), Error<I::Error, S::Error>> {
        self.update_config(target, |variant| {
            timing::shunt_conversion(variant.info().layout, micros)
        })
    }

    /// Enable or disable an alert pin function
    ///
    /// Enabling replaces whatever function was active before and writes the
    /// limit; disabling clears all functions. Devices without alert support
    /// are left untouched.
    ///
    /// Returns `false` if any targeted device does not support `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    pub fn configure_alert(
        &mut self,
        target: Target,
        kind: AlertKind,
        enable: bool,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        let mut supported = true;
        for index in self.targets(target)? {
            let detail = self.detail(index)?;
            if !kind.supported_by(&detail) {
                supported = false;
                continue;
            }
            self.device.interface.select(detail.address());

            if enable {
                if let Some(limit) = kind.limit(&detail) {
                    self.device.alert_limit().write(|w| {
                        w.set_limit(limit);
                    })?;
                }
            }
            self.device.mask_enable().modify(|w| {
                w.set_shunt_over(false);
                w.set_shunt_under(false);
                w.set_bus_over(false);
                w.set_bus_under(false);
                w.set_power_over(false);
                w.set_conversion_ready_alert(false);
                if enable {
                    match kind {
                        AlertKind::ShuntOverVoltage { .. } => w.set_shunt_over(true),
                        AlertKind::ShuntUnderVoltage { .. } => w.set_shunt_under(true),
                        AlertKind::BusOverVoltage { .. } => w.set_bus_over(true),
                        AlertKind::BusUnderVoltage { .. } => w.set_bus_under(true),
                        AlertKind::PowerOverLimit { .. } => w.set_power_over(true),
                        AlertKind::ConversionReady => w.set_conversion_ready_alert(true),
                    }
                }
            })?;
        }
        Ok(supported)
    }

    /// Assert the alert pin when a conversion is ready
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_conversion(
        &mut self,
        target: Target,
        enable: bool,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::ConversionReady, enable)
    }

    /// Assert the alert pin when the shunt voltage rises above `millivolts`
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_shunt_over_voltage(
        &mut self,
        target: Target,
        enable: bool,
        millivolts: i32,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::ShuntOverVoltage { millivolts }, enable)
    }

    /// Assert the alert pin when the shunt voltage drops below `millivolts`
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_shunt_under_voltage(
        &mut self,
        target: Target,
        enable: bool,
        millivolts: i32,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::ShuntUnderVoltage { millivolts }, enable)
    }

    /// Assert the alert pin when the bus voltage rises above `millivolts`
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_bus_over_voltage(
        &mut self,
        target: Target,
        enable: bool,
        millivolts: u32,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::BusOverVoltage { millivolts }, enable)
    }

    /// Assert the alert pin when the bus voltage drops below `millivolts`
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_bus_under_voltage(
        &mut self,
        target: Target,
        enable: bool,
        millivolts: u32,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::BusUnderVoltage { millivolts }, enable)
    }

    /// Assert the alert pin when the power rises above `milliwatts`
    ///
    /// # Errors
    ///
    /// See [`configure_alert`](Self::configure_alert).
    pub fn alert_on_power_over_limit(
        &mut self,
        target: Target,
        enable: bool,
        milliwatts: u32,
    ) -> Result<bool, Error<I::Error, S::Error>> {
        self.configure_alert(target, AlertKind::PowerOverLimit { milliwatts }, enable)
    }

    /// Raw bus voltage register, unused low bits removed
    ///
    /// In a triggered mode the next conversion is started after the read.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn bus_raw(&mut self, index: u8) -> Result<u16, Error<I::Error, S::Error>> {
        let detail = self.select(index)?;
        let raw = self.read_bus(&detail)?;
        let mode = detail.record.mode;
        if mode.is_triggered() && mode.bus_enabled() {
            self.retrigger()?;
        }
        Ok(raw)
    }

    /// Bus voltage in millivolts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn bus_millivolts(&mut self, index: u8) -> Result<u32, Error<I::Error, S::Error>> {
        let raw = self.bus_raw(index)?;
        let detail = self.detail(index)?;
        Ok(detail.bus_scale().apply(i64::from(raw)) as u32)
    }

    /// Raw shunt voltage register (signed), unused low bits removed
    ///
    /// On the INA260 this is the current register.
    /// In a triggered mode the next conversion is started after the read.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn shunt_raw(&mut self, index: u8) -> Result<i16, Error<I::Error, S::Error>> {
        let detail = self.select(index)?;
        let raw = self.read_shunt(&detail)?;
        let mode = detail.record.mode;
        if mode.is_triggered() && mode.shunt_enabled() {
            self.retrigger()?;
        }
        Ok(raw)
    }

    /// Shunt voltage in microvolts
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn shunt_microvolts(&mut self, index: u8) -> Result<i32, Error<I::Error, S::Error>> {
        let raw = self.shunt_raw(index)?;
        let detail = self.detail(index)?;
        Ok(detail.shunt_scale().apply(i64::from(raw)) as i32)
    }

    /// Current in microamps
    ///
    /// The INA3221 has no current register; its current is derived from the
    /// shunt voltage and the configured shunt resistance.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn bus_microamps(&mut self, index: u8) -> Result<i64, Error<I::Error, S::Error>> {
        let detail = self.select(index)?;
        match detail.current_register() {
            Some(register) => {
                let raw = interface::read_word(&mut self.device.interface, register)? as i16;
                Ok(i64::from(raw) * i64::from(detail.calibration.current_lsb_na) / 1000)
            }
            None => {
                let shunt = detail.record.shunt_micro_ohms;
                if shunt == 0 {
                    return Ok(0);
                }
                let microvolts = i64::from(self.shunt_microvolts(index)?);
                Ok(microvolts * 1_000_000 / i64::from(shunt))
            }
        }
    }

    /// Power in microwatts
    ///
    /// The power register is unsigned; the sign of the shunt voltage is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn bus_microwatts(&mut self, index: u8) -> Result<i64, Error<I::Error, S::Error>> {
        let detail = self.select(index)?;
        match detail.power_register() {
            Some(register) => {
                let raw = interface::read_word(&mut self.device.interface, register)?;
                let microwatts =
                    i64::from(raw) * i64::from(detail.calibration.power_lsb_nw) / 1000;
                if self.read_shunt(&detail)? < 0 {
                    Ok(-microwatts)
                } else {
                    Ok(microwatts)
                }
            }
            None => {
                let microamps = self.bus_microamps(index)?;
                let millivolts = i64::from(self.bus_millivolts(index)?);
                Ok(microamps * millivolts / 1000)
            }
        }
    }

    /// Reset devices and re-initialise them from their records
    ///
    /// The mode returns to continuous shunt and bus conversions.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with a device or the store fails.
    pub fn reset(&mut self, target: Target) -> Result<(), Error<I::Error, S::Error>> {
        for index in self.targets(target)? {
            let detail = self.select(index)?;
            self.device.configuration().write(|w| {
                w.set_reset(true);
            })?;
            self.initialize(index, detail)?;
        }
        Ok(())
    }

    /// Check whether a device has finished a conversion
    ///
    /// Reading the flag clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device or the store fails.
    pub fn conversion_finished(&mut self, index: u8) -> Result<bool, Error<I::Error, S::Error>> {
        let detail = self.select(index)?;
        let ready = match detail.variant().info().ready {
            ReadyFlag::BusRegister => {
                let raw = interface::read_word(&mut self.device.interface, detail.bus_register())?;
                let ready = raw & 0x0002 != 0;
                if ready {
                    // CNVR clears on a power register read
                    interface::read_word(&mut self.device.interface, reg::POWER)?;
                }
                ready
            }
            ReadyFlag::MaskEnable => self.device.mask_enable().read()?.conversion_ready(),
            ReadyFlag::ChannelMaskEnable => {
                self.device.channel_mask_enable().read()?.conversion_ready()
            }
        };
        Ok(ready)
    }

    /// Block until the targeted devices have finished a conversion
    ///
    /// Polls every `poll_interval_us` for at most `conversion_timeout_us` per
    /// device.
    ///
    /// # Errors
    ///
    /// Returns `ConversionTimeout` with the index of the first device that did
    /// not finish in time, or a bus/store error.
    pub fn wait_for_conversion<D>(
        &mut self,
        target: Target,
        delay: &mut D,
    ) -> Result<(), Error<I::Error, S::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        let poll = self.config.poll_interval_us.max(1);
        let polls = self.config.conversion_timeout_us / poll;

        'devices: for index in self.targets(target)? {
            if self.conversion_finished(index)? {
                continue;
            }
            for _ in 0..polls {
                delay.delay_us(poll);
                if self.conversion_finished(index)? {
                    continue 'devices;
                }
            }
            #[cfg(feature = "defmt")]
            defmt::warn!("INA: device {=u8} conversion timed out", index);
            return Err(Error::ConversionTimeout(index));
        }
        Ok(())
    }

    /// Consume the driver and return the bus interface and the store
    pub fn release(self) -> (I, S) {
        (self.device.interface, self.registry.release())
    }

    /// Get a reference to the underlying register device (for advanced usage)
    pub const fn device(&self) -> &RegisterDevice<I> {
        &self.device
    }

    /// Program calibration and mode for a device and persist its record
    fn initialize(&mut self, index: u8, mut detail: DeviceDetail) -> Result<(), Error<I::Error, S::Error>> {
        detail.record.mode = OperatingMode::ContinuousBoth;
        self.program(&detail)?;
        self.registry.store::<I::Error>(index, &detail)?;
        self.sync_channels(index, &detail)
    }

    /// Persist `mode` for a device and the other channels of its chip
    fn store_mode(
        &mut self,
        index: u8,
        mut detail: DeviceDetail,
        mode: OperatingMode,
    ) -> Result<(), Error<I::Error, S::Error>> {
        detail.record.mode = mode;
        self.registry.store::<I::Error>(index, &detail)?;
        self.sync_channels(index, &detail)
    }

    /// Copy the mode of a multi-channel device to its sibling channels
    fn sync_channels(&mut self, index: u8, detail: &DeviceDetail) -> Result<(), Error<I::Error, S::Error>> {
        if !detail.variant().is_multi_channel() {
            return Ok(());
        }
        for other in 0..self.registry.count() {
            if other == index {
                continue;
            }
            let mut sibling = self.detail(other)?;
            if sibling.variant().is_multi_channel()
                && sibling.address() == detail.address()
                && sibling.record.mode != detail.record.mode
            {
                sibling.record.mode = detail.record.mode;
                self.registry.store::<I::Error>(other, &sibling)?;
            }
        }
        Ok(())
    }

    /// Write the configuration and calibration registers of a device
    pub(crate) fn program(&mut self, detail: &DeviceDetail) -> Result<(), Error<I::Error, S::Error>> {
        self.device.interface.select(detail.address());

        if let Some(gain) = detail.calibration.gain {
            let config = gain.ina219_config();
            self.write_config(config)?;

            // Drop to the 16 V range when the bus voltage allows it
            let millivolts = detail.bus_scale().apply(i64::from(self.read_bus(detail)?));
            let (low, high) = INA219_LOW_RANGE_MV;
            if millivolts > i64::from(low) && millivolts < i64::from(high) {
                self.write_config(config & !INA219_BRNG)?;
            }
        } else {
            self.device.configuration().modify(|w| {
                w.set_mode(OperatingMode::ContinuousBoth.bits());
            })?;
        }

        if let Some(value) = detail.calibration.register {
            self.device.calibration().write(|w| {
                w.set_value(value);
            })?;
        }
        Ok(())
    }

    /// Table indices covered by `target`
    fn targets(&self, target: Target) -> Result<Range<u8>, Error<I::Error, S::Error>> {
        match target {
            Target::All => Ok(0..self.registry.count()),
            Target::Device(index) if index < self.registry.count() => Ok(index..index + 1),
            Target::Device(index) => Err(Error::UnknownDevice(index)),
        }
    }

    /// Load a device and point the bus at it
    fn select(&mut self, index: u8) -> Result<DeviceDetail, Error<I::Error, S::Error>> {
        let detail = self.detail(index)?;
        self.device.interface.select(detail.address());
        Ok(detail)
    }

    /// Read-modify-write variant specific configuration bits
    fn update_config<F>(&mut self, target: Target, field: F) -> Result<(), Error<I::Error, S::Error>>
    where
        F: Fn(Variant) -> FieldUpdate,
    {
        for index in self.targets(target)? {
            let detail = self.select(index)?;
            let update = field(detail.variant());
            self.device.configuration().modify(|w| {
                w.set_settings(update.apply_settings(w.settings()));
            })?;
        }
        Ok(())
    }

    /// Start a single-shot conversion by rewriting the configuration
    fn retrigger(&mut self) -> Result<(), Error<I::Error, S::Error>> {
        self.device.configuration().modify(|_| {})?;
        Ok(())
    }

    /// Configuration register of the selected device as one word
    pub(crate) fn read_config(&mut self) -> Result<u16, Error<I::Error, S::Error>> {
        let config = self.device.configuration().read()?;
        Ok(config_word(config.mode(), config.settings(), config.reset()))
    }

    /// Write a whole configuration word to the selected device
    pub(crate) fn write_config(&mut self, word: u16) -> Result<(), Error<I::Error, S::Error>> {
        let (mode, settings, reset) = config_fields(word);
        self.device.configuration().write(|w| {
            w.set_mode(mode);
            w.set_settings(settings);
            w.set_reset(reset);
        })?;
        Ok(())
    }

    fn read_bus(&mut self, detail: &DeviceDetail) -> Result<u16, Error<I::Error, S::Error>> {
        let raw = interface::read_word(&mut self.device.interface, detail.bus_register())?;
        Ok(raw >> detail.variant().info().bus_shift)
    }

    fn read_shunt(&mut self, detail: &DeviceDetail) -> Result<i16, Error<I::Error, S::Error>> {
        let raw = interface::read_word(&mut self.device.interface, detail.shunt_register())? as i16;
        Ok(raw >> detail.variant().info().shunt_shift)
    }
}
