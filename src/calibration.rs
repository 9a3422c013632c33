//! Calibration maths
//!
//! The INA219 and INA226 family compute current and power on-chip from a
//! calibration register programmed with
//!
//! ```text
//! current_lsb = max_amps / 2^15
//! calibration = K / (current_lsb * R_shunt)
//! ```
//!
//! with `K = 0.04096` (INA219) or `0.00512` (INA226/230/231). Everything here
//! runs in integer nano-units so no float support is needed on the target.
//!
//! # Example
//!
//! ```
//! use ina::{CalibrationParams, Variant};
//! use ina::calibration::compute;
//!
//! // 1 A through a 0.1 Ω shunt
//! let params = CalibrationParams::new(1, 100_000)?;
//! let cal = compute(Variant::Ina219, params);
//! assert_eq!(cal.current_lsb_na, 30_518);
//! assert_eq!(cal.register, Some(13_421));
//! # Ok::<(), ina::Error<(), ()>>(())
//! ```

use crate::variant::Variant;
use crate::{Error, MAX_BUS_AMPS, MAX_SHUNT_MICRO_OHMS};

/// Full scale of the signed 16-bit current register
const CURRENT_FULL_SCALE: u64 = 32_767;

/// Fixed-point scale applied to the calibration constants and the shunt term
const FIXED_POINT: u64 = 100_000;

/// INA219 power-on configuration value
pub const INA219_DEFAULT_CONFIG: u16 = 0x399F;

/// INA219 PGA field (bits 11-12)
const INA219_PGA_MASK: u16 = 0x1800;
const INA219_PGA_SHIFT: u16 = 11;

/// INA219 bus range bit: set = 32 V, clear = 16 V
pub const INA219_BRNG: u16 = 1 << 13;

/// Bus readings inside this window (mV, exclusive) select the 16 V range
pub const INA219_LOW_RANGE_MV: (i32, i32) = (20, 16_000);

/// Parameters describing the measurement circuit of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationParams {
    /// Expected maximum current in amps (at most 1022)
    pub max_amps: u16,
    /// Shunt resistance in µΩ (at most 1 048 575)
    pub shunt_micro_ohms: u32,
}

impl Default for CalibrationParams {
    /// 1 A through a 0.1 Ω shunt, the common breakout board fit
    fn default() -> Self {
        Self {
            max_amps: 1,
            shunt_micro_ohms: 100_000,
        }
    }
}

impl CalibrationParams {
    /// Create calibration parameters
    ///
    /// Values above the storable range are clamped.
    ///
    /// # Arguments
    /// * `max_amps` - Expected maximum current in amps
    /// * `shunt_micro_ohms` - Shunt resistance in µΩ
    ///
    /// # Errors
    /// Returns `InvalidConfig` if either value is zero
    pub const fn new(max_amps: u16, shunt_micro_ohms: u32) -> Result<Self, Error<(), ()>> {
        if max_amps == 0 || shunt_micro_ohms == 0 {
            return Err(Error::InvalidConfig);
        }
        let max_amps = if max_amps > MAX_BUS_AMPS {
            MAX_BUS_AMPS
        } else {
            max_amps
        };
        let shunt_micro_ohms = if shunt_micro_ohms > MAX_SHUNT_MICRO_OHMS {
            MAX_SHUNT_MICRO_OHMS
        } else {
            shunt_micro_ohms
        };
        Ok(Self {
            max_amps,
            shunt_micro_ohms,
        })
    }
}

/// INA219 programmable gain amplifier setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgrammableGain {
    /// ±40 mV shunt range
    Div1 = 0,
    /// ±80 mV shunt range
    Div2 = 1,
    /// ±160 mV shunt range
    Div4 = 2,
    /// ±320 mV shunt range
    Div8 = 3,
}

impl ProgrammableGain {
    /// Smallest range that holds the expected full-scale shunt voltage
    #[must_use]
    pub const fn for_shunt_millivolts(max_shunt_mv: u32) -> Self {
        if max_shunt_mv <= 40 {
            Self::Div1
        } else if max_shunt_mv <= 80 {
            Self::Div2
        } else if max_shunt_mv <= 160 {
            Self::Div4
        } else {
            Self::Div8
        }
    }

    /// Gain needed for a circuit
    #[must_use]
    pub const fn for_params(params: CalibrationParams) -> Self {
        let max_shunt_mv =
            params.max_amps as u64 * params.shunt_micro_ohms as u64 / 1000;
        let clamped = if max_shunt_mv > u32::MAX as u64 {
            u32::MAX
        } else {
            max_shunt_mv as u32
        };
        Self::for_shunt_millivolts(clamped)
    }

    /// INA219 configuration value with this gain and the 32 V bus range
    #[must_use]
    pub const fn ina219_config(self) -> u16 {
        (INA219_DEFAULT_CONFIG & !INA219_PGA_MASK)
            | ((self as u16) << INA219_PGA_SHIFT)
            | INA219_BRNG
    }
}

/// Derived scaling constants for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Datasheet calibration constant (×1e5), 0 when the variant has none
    pub constant: u32,
    /// Value for the calibration register, `None` when the variant has none
    pub register: Option<u16>,
    /// Current register LSB in nA
    pub current_lsb_na: u32,
    /// Power register LSB in nW
    pub power_lsb_nw: u32,
    /// INA219 gain setting
    pub gain: Option<ProgrammableGain>,
}

/// Compute the scaling constants of `variant` for a circuit
#[must_use]
pub fn compute(variant: Variant, params: CalibrationParams) -> Calibration {
    let info = variant.info();

    if let Some((current_lsb_na, power_lsb_nw)) = info.fixed_lsb {
        return Calibration {
            current_lsb_na,
            power_lsb_nw,
            ..Calibration::default()
        };
    }

    let Some(family) = info.calibration else {
        return Calibration::default();
    };

    let current_lsb = u64::from(params.max_amps) * 1_000_000_000 / CURRENT_FULL_SCALE;
    let divisor = current_lsb * u64::from(params.shunt_micro_ohms) / FIXED_POINT;
    let limit = u64::from(family.register_max);
    let register = if divisor == 0 {
        limit
    } else {
        (u64::from(family.constant) * FIXED_POINT / divisor).min(limit)
    };

    Calibration {
        constant: family.constant,
        register: Some(register as u16),
        current_lsb_na: current_lsb as u32,
        power_lsb_nw: (current_lsb * u64::from(family.power_multiplier)) as u32,
        gain: match variant {
            Variant::Ina219 => Some(ProgrammableGain::for_params(params)),
            _ => None,
        },
    }
}
