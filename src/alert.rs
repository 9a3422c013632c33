//! Alert pin functions
//!
//! Parts with a mask/enable register (INA226, INA230, INA231, INA260) can
//! drive their ALERT pin from one limit comparison at a time, or from the
//! conversion ready flag. Limits are given in physical units and converted to
//! counts of the monitored register here.

use crate::registry::DeviceDetail;

/// Alert pin function together with its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertKind {
    /// Assert when a conversion has finished
    ConversionReady,
    /// Shunt voltage above the limit
    ShuntOverVoltage {
        /// Limit in mV
        millivolts: i32,
    },
    /// Shunt voltage below the limit
    ShuntUnderVoltage {
        /// Limit in mV
        millivolts: i32,
    },
    /// Bus voltage above the limit
    BusOverVoltage {
        /// Limit in mV
        millivolts: u32,
    },
    /// Bus voltage below the limit
    BusUnderVoltage {
        /// Limit in mV
        millivolts: u32,
    },
    /// Power above the limit
    PowerOverLimit {
        /// Limit in mW
        milliwatts: u32,
    },
}

impl AlertKind {
    /// The device can drive its alert pin from this function
    #[must_use]
    pub fn supported_by(self, detail: &DeviceDetail) -> bool {
        let info = detail.variant().info();
        if !info.alerts {
            return false;
        }
        match self {
            // The INA260 compares against its current register instead
            Self::ShuntOverVoltage { .. } | Self::ShuntUnderVoltage { .. } => {
                info.calibration.is_some()
            }
            _ => true,
        }
    }

    /// Alert limit register value, `None` for the conversion ready function
    #[must_use]
    pub fn limit(self, detail: &DeviceDetail) -> Option<u16> {
        match self {
            Self::ConversionReady => None,
            Self::ShuntOverVoltage { millivolts } | Self::ShuntUnderVoltage { millivolts } => {
                let counts = detail.shunt_scale().invert(i64::from(millivolts) * 1000);
                // Shunt limits are two's complement like the register they match
                Some(counts.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16 as u16)
            }
            Self::BusOverVoltage { millivolts } | Self::BusUnderVoltage { millivolts } => {
                let counts = detail.bus_scale().invert(i64::from(millivolts));
                Some(counts.clamp(0, i64::from(u16::MAX)) as u16)
            }
            Self::PowerOverLimit { milliwatts } => {
                let lsb = u64::from(detail.calibration.power_lsb_nw);
                let counts = if lsb == 0 {
                    u64::from(u16::MAX)
                } else {
                    u64::from(milliwatts) * 1_000_000 / lsb
                };
                Some(counts.min(u64::from(u16::MAX)) as u16)
            }
        }
    }
}
