//! Device discovery
//!
//! None of the supported parts has a reliable "who am I" register, the INA219
//! not even a manufacturer ID. Instead every variant is recognised by the value
//! its configuration register takes right after a software reset:
//!
//! | Post-reset value | Variant |
//! |------------------|---------|
//! | `0x399F` | INA219 |
//! | `0x4127` | INA226, INA230 or INA231 (die ID decides) |
//! | `0x6127` | INA260 |
//! | `0x7127` | INA3221 |
//!
//! Writing the reset bit to a chip that is not an INA leaves `0x8000` in the
//! register, in which case the original value is put back.

use crate::device::InaDriver;
use crate::interface::Bus;
use crate::registry::DeviceDetail;
use crate::record::DeviceRecord;
use crate::store::RecordStore;
use crate::variant::{Channel, Variant};
use crate::{CalibrationParams, Error};

/// Value written to the configuration register to reset a device
pub const RESET_PATTERN: u16 = 0x8000;

/// INA219 post-reset configuration
pub const INA219_SIGNATURE: u16 = 0x399F;
/// INA226/230/231 post-reset configuration
pub const INA226_SIGNATURE: u16 = 0x4127;
/// INA260 post-reset configuration
pub const INA260_SIGNATURE: u16 = 0x6127;
/// INA3221 post-reset configuration
pub const INA3221_SIGNATURE: u16 = 0x7127;
/// Die ID of a genuine INA226
pub const INA226_DIE_ID: u16 = 0x2260;

/// The die ID register is needed to tell variants with this signature apart
#[must_use]
pub const fn needs_die_id(config: u16) -> bool {
    config == INA226_SIGNATURE
}

/// Map a post-reset configuration value (and die ID, if read) to a variant
///
/// The INA3221 is reported as its first channel. Returns `None` for any value
/// outside the supported set.
#[must_use]
pub const fn classify(config: u16, die_id: Option<u16>) -> Option<Variant> {
    match config {
        INA219_SIGNATURE => Some(Variant::Ina219),
        INA226_SIGNATURE => match die_id {
            Some(INA226_DIE_ID) => Some(Variant::Ina226),
            Some(0) => Some(Variant::Ina231),
            Some(_) => Some(Variant::Ina230),
            None => None,
        },
        INA260_SIGNATURE => Some(Variant::Ina260),
        INA3221_SIGNATURE => Some(Variant::Ina3221(Channel::First)),
        _ => None,
    }
}

impl<I, S> InaDriver<I, S>
where
    I: Bus,
    S: RecordStore,
{
    /// Walk the configured address range and add every recognised device
    ///
    /// Addresses are not touched once the table is full. A bus error on one
    /// address skips that address; store errors abort the scan.
    pub(crate) fn scan(&mut self, params: CalibrationParams) -> Result<u8, Error<I::Error, S::Error>> {
        let before = self.registry.count();
        let range = self.config.scan.first_address..=self.config.scan.last_address;

        for address in range {
            if self.registry.is_full() {
                #[cfg(feature = "defmt")]
                defmt::warn!("INA: device table full, scan stopped at {=u8:#x}", address);
                break;
            }
            if !self.device.interface.acknowledges(address) {
                continue;
            }
            self.device.interface.select(address);

            let variant = match self.identify_selected() {
                Ok(Some(variant)) => variant,
                Ok(None) => continue,
                Err(Error::Bus(_)) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("INA: bus error identifying {=u8:#x}, skipped", address);
                    continue;
                }
                Err(e) => return Err(e),
            };

            #[cfg(feature = "defmt")]
            defmt::info!("INA: found {} at {=u8:#x}", variant.name(), address);

            match self.add_device(variant, address, params) {
                Ok(()) | Err(Error::Bus(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(self.registry.count() - before)
    }

    /// Reset the selected device and classify it from the post-reset state
    fn identify_selected(&mut self) -> Result<Option<Variant>, Error<I::Error, S::Error>> {
        let saved = self.read_config()?;
        self.device.configuration().write(|w| {
            w.set_reset(true);
        })?;
        let after = self.read_config()?;

        if after == RESET_PATTERN {
            // Plain register, not an INA
            self.write_config(saved)?;
            return Ok(None);
        }

        let die_id = if needs_die_id(after) {
            Some(self.device.die_id().read()?.id())
        } else {
            None
        };

        let variant = classify(after, die_id);
        #[cfg(feature = "defmt")]
        {
            if variant.is_none() {
                defmt::debug!("INA: unknown signature {=u16:#x}", after);
            }
        }
        Ok(variant)
    }

    /// Program and register a newly found device (all channels of an INA3221)
    fn add_device(
        &mut self,
        variant: Variant,
        address: u8,
        params: CalibrationParams,
    ) -> Result<(), Error<I::Error, S::Error>> {
        let channels: &[Variant] = match variant {
            Variant::Ina3221(_) => &[
                Variant::Ina3221(Channel::First),
                Variant::Ina3221(Channel::Second),
                Variant::Ina3221(Channel::Third),
            ],
            _ => &[variant],
        };

        for &logical in channels {
            if self.registry.is_full() {
                break;
            }
            let record = DeviceRecord::new(logical, address, params.max_amps, params.shunt_micro_ohms);
            let detail = DeviceDetail::new(record);
            self.program(&detail)?;
            self.registry.push::<I::Error>(&detail)?;
        }
        Ok(())
    }
}
