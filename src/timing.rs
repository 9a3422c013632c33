//! Averaging and conversion time encoding
//!
//! Requested values are rounded down to the nearest setting the chip
//! supports. The INA219 has no separate averaging field: its ADC settings
//! select either a resolution (codes 0-3) or a sample count at 12 bits
//! (codes 8-15), so averaging and conversion time share the same bits.

use crate::registers::SETTINGS_SHIFT;
use crate::variant::ConfigLayout;

/// A masked update of configuration register bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldUpdate {
    /// Bits owned by the field
    pub mask: u16,
    /// New field contents, already shifted
    pub bits: u16,
}

impl FieldUpdate {
    const fn new(mask: u16, shift: u16, code: u8) -> Self {
        Self {
            mask,
            bits: ((code as u16) << shift) & mask,
        }
    }

    /// Merge into an existing configuration value
    #[must_use]
    pub const fn apply(self, config: u16) -> u16 {
        (config & !self.mask) | self.bits
    }

    /// Merge into the `settings` field (configuration bits 3-14)
    #[must_use]
    pub const fn apply_settings(self, settings: u16) -> u16 {
        (self.apply(settings << SETTINGS_SHIFT) >> SETTINGS_SHIFT) & 0x0FFF
    }
}

const INA219_BADC_SHIFT: u16 = 7;
const INA219_BADC_MASK: u16 = 0x0780;
const INA219_SADC_SHIFT: u16 = 3;
const INA219_SADC_MASK: u16 = 0x0078;

const AVG_SHIFT: u16 = 9;
const AVG_MASK: u16 = 0x0E00;
const VBUSCT_SHIFT: u16 = 6;
const VBUSCT_MASK: u16 = 0x01C0;
const VSHCT_SHIFT: u16 = 3;
const VSHCT_MASK: u16 = 0x0038;

/// INA219 averaged modes: (samples, code)
const INA219_AVERAGING: [(u16, u8); 8] = [
    (128, 15),
    (64, 14),
    (32, 13),
    (16, 12),
    (8, 11),
    (4, 10),
    (2, 9),
    (1, 8),
];

/// INA226 style AVG field: (samples, code)
const AVERAGING: [(u16, u8); 8] = [
    (1024, 7),
    (512, 6),
    (256, 5),
    (128, 4),
    (64, 3),
    (16, 2),
    (4, 1),
    (1, 0),
];

/// INA219 ADC settings by conversion time in µs
const INA219_CONVERSION: [(u32, u8); 10] = [
    (68_100, 15),
    (34_050, 14),
    (17_020, 13),
    (8_510, 12),
    (4_260, 11),
    (2_130, 10),
    (1_060, 9),
    (532, 8),
    (276, 2),
    (148, 1),
];

/// INA226 style conversion times in µs
const CONVERSION: [(u32, u8); 7] = [
    (8_244, 7),
    (4_156, 6),
    (2_116, 5),
    (1_100, 4),
    (588, 3),
    (332, 2),
    (204, 1),
];

fn lookup<T: PartialOrd + Copy>(table: &[(T, u8)], value: T) -> u8 {
    table
        .iter()
        .find(|&&(threshold, _)| value >= threshold)
        .map_or(0, |&(_, code)| code)
}

/// Averaging field for a requested sample count
///
/// On the INA219 both ADCs are switched to averaged 12-bit mode.
#[must_use]
pub fn averaging(layout: ConfigLayout, samples: u16) -> FieldUpdate {
    match layout {
        ConfigLayout::Ina219 => {
            // A count of zero still means "one sample"
            let code = lookup(&INA219_AVERAGING, samples).max(8);
            FieldUpdate {
                mask: INA219_BADC_MASK | INA219_SADC_MASK,
                bits: FieldUpdate::new(INA219_BADC_MASK, INA219_BADC_SHIFT, code).bits
                    | FieldUpdate::new(INA219_SADC_MASK, INA219_SADC_SHIFT, code).bits,
            }
        }
        ConfigLayout::Ina226 => FieldUpdate::new(AVG_MASK, AVG_SHIFT, lookup(&AVERAGING, samples)),
    }
}

/// Bus voltage conversion time field for a requested time in µs
#[must_use]
pub fn bus_conversion(layout: ConfigLayout, micros: u32) -> FieldUpdate {
    match layout {
        ConfigLayout::Ina219 => FieldUpdate::new(
            INA219_BADC_MASK,
            INA219_BADC_SHIFT,
            lookup(&INA219_CONVERSION, micros),
        ),
        ConfigLayout::Ina226 => {
            FieldUpdate::new(VBUSCT_MASK, VBUSCT_SHIFT, lookup(&CONVERSION, micros))
        }
    }
}

/// Shunt voltage conversion time field for a requested time in µs
#[must_use]
pub fn shunt_conversion(layout: ConfigLayout, micros: u32) -> FieldUpdate {
    match layout {
        ConfigLayout::Ina219 => FieldUpdate::new(
            INA219_SADC_MASK,
            INA219_SADC_SHIFT,
            lookup(&INA219_CONVERSION, micros),
        ),
        ConfigLayout::Ina226 => {
            FieldUpdate::new(VSHCT_MASK, VSHCT_SHIFT, lookup(&CONVERSION, micros))
        }
    }
}
