//! Supported chip variants and their constant tables
//!
//! Every variant shares the configuration register at 0x00 and the reset bit,
//! but the measurement register map, the LSB sizes and the calibration maths
//! differ. All of that is captured once per variant in a [`VariantInfo`] so the
//! rest of the driver never has to match on the variant itself.
//!
//! | Variant | Bus LSB | Shunt LSB | Current reg | Calibration |
//! |---------|---------|-----------|-------------|-------------|
//! | INA219  | 4 mV    | 10 µV     | 0x04        | 0.04096     |
//! | INA226/230/231 | 1.25 mV | 2.5 µV | 0x04  | 0.00512     |
//! | INA260  | 1.25 mV | 2.5 µV*   | 0x01        | fixed       |
//! | INA3221 | 8 mV    | 40 µV     | none        | none        |
//!
//! *The INA260 has an internal 2 mΩ shunt and no shunt voltage register; its
//! shunt voltage is read from the current register (1.25 mA × 2 mΩ = 2.5 µV).

/// One of the three INA3221 measurement channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Channel 1 (shunt 0x01, bus 0x02)
    First = 0,
    /// Channel 2 (shunt 0x03, bus 0x04)
    Second = 1,
    /// Channel 3 (shunt 0x05, bus 0x06)
    Third = 2,
}

impl Channel {
    /// All channels in register order
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// Register address offset of this channel relative to channel 1
    #[must_use]
    pub const fn register_offset(self) -> u8 {
        (self as u8) * 2
    }
}

/// A chip variant within the supported family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// INA219 / INA220, 12-bit, programmable gain
    Ina219,
    /// INA226, 16-bit, die ID 0x2260
    Ina226,
    /// INA230, INA226 register map with a non-zero die ID register
    Ina230,
    /// INA231, INA226 register map with an empty die ID register
    Ina231,
    /// INA260, internal 2 mΩ shunt
    Ina260,
    /// INA3221, one logical device per channel
    Ina3221(Channel),
}

/// Layout of the averaging and conversion-time fields in the configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigLayout {
    /// INA219: BADC in bits 7-10, SADC in bits 3-6, no separate averaging field
    Ina219,
    /// INA226 family, INA260 and INA3221: AVG 9-11, VBUSCT 6-8, VSHCT 3-5
    Ina226,
}

/// Where a variant signals a finished conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyFlag {
    /// CNVR bit (1) of the bus voltage register, cleared by reading the power register
    BusRegister,
    /// CVRF bit (3) of the mask/enable register at 0x06
    MaskEnable,
    /// CVRF bit (0) of the INA3221 mask/enable register at 0x0F
    ChannelMaskEnable,
}

/// Rational LSB size: `value = raw * num / den`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scale {
    /// Numerator
    pub num: u32,
    /// Denominator
    pub den: u32,
}

impl Scale {
    /// Create a new scale
    #[must_use]
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Convert a raw register count to physical units
    #[must_use]
    pub const fn apply(self, raw: i64) -> i64 {
        raw * self.num as i64 / self.den as i64
    }

    /// Convert a physical value back to register counts
    #[must_use]
    pub const fn invert(self, value: i64) -> i64 {
        value * self.den as i64 / self.num as i64
    }
}

/// Calibration register family of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationFamily {
    /// Datasheet calibration numerator, scaled by 1e5 (0.04096 -> 4096)
    pub constant: u32,
    /// Power LSB as a multiple of the current LSB
    pub power_multiplier: u32,
    /// Largest value the calibration register accepts
    pub register_max: u16,
}

/// Constant table entry for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VariantInfo {
    /// Human readable device name
    pub name: &'static str,
    /// Bus voltage register (channel 1 for the INA3221)
    pub bus_register: u8,
    /// Shunt voltage register (channel 1 for the INA3221)
    pub shunt_register: u8,
    /// Current register, if the device computes current itself
    pub current_register: Option<u8>,
    /// Power register, if the device computes power itself
    pub power_register: Option<u8>,
    /// Unused low bits in the bus voltage register
    pub bus_shift: u8,
    /// Unused low bits in the shunt voltage register
    pub shunt_shift: u8,
    /// Bus voltage LSB, raw count to millivolts
    pub bus_scale: Scale,
    /// Shunt voltage LSB, raw count to microvolts
    pub shunt_scale: Scale,
    /// Calibration family, `None` when there is no calibration register
    pub calibration: Option<CalibrationFamily>,
    /// Hardware-fixed (current LSB nA, power LSB nW) for shuntless parts
    pub fixed_lsb: Option<(u32, u32)>,
    /// Device has the mask/enable and alert limit registers
    pub alerts: bool,
    /// Bit layout of the configuration register
    pub layout: ConfigLayout,
    /// Conversion ready indicator
    pub ready: ReadyFlag,
}

/// Measurement register addresses
///
/// Fixed-address control registers are described in [`crate::registers`].
pub mod reg {
    /// Shunt voltage register (INA219, INA226 family)
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    /// Bus voltage register
    pub const BUS_VOLTAGE: u8 = 0x02;
    /// Power register
    pub const POWER: u8 = 0x03;
    /// Current register (INA219, INA226 family)
    pub const CURRENT: u8 = 0x04;
}

/// INA260 current register
pub const INA260_CURRENT_REGISTER: u8 = 0x01;

const INA219: VariantInfo = VariantInfo {
    name: "INA219",
    bus_register: reg::BUS_VOLTAGE,
    shunt_register: reg::SHUNT_VOLTAGE,
    current_register: Some(reg::CURRENT),
    power_register: Some(reg::POWER),
    bus_shift: 3,
    shunt_shift: 0,
    bus_scale: Scale::new(400, 100),
    shunt_scale: Scale::new(100, 10),
    calibration: Some(CalibrationFamily {
        constant: 4096,
        power_multiplier: 20,
        register_max: 0xFFFE,
    }),
    fixed_lsb: None,
    alerts: false,
    layout: ConfigLayout::Ina219,
    ready: ReadyFlag::BusRegister,
};

const INA226_FAMILY: CalibrationFamily = CalibrationFamily {
    constant: 512,
    power_multiplier: 25,
    register_max: 0x7FFF,
};

const INA226: VariantInfo = VariantInfo {
    name: "INA226",
    bus_register: reg::BUS_VOLTAGE,
    shunt_register: reg::SHUNT_VOLTAGE,
    current_register: Some(reg::CURRENT),
    power_register: Some(reg::POWER),
    bus_shift: 0,
    shunt_shift: 0,
    bus_scale: Scale::new(125, 100),
    shunt_scale: Scale::new(25, 10),
    calibration: Some(INA226_FAMILY),
    fixed_lsb: None,
    alerts: true,
    layout: ConfigLayout::Ina226,
    ready: ReadyFlag::MaskEnable,
};

const INA230: VariantInfo = VariantInfo {
    name: "INA230",
    ..INA226
};

const INA231: VariantInfo = VariantInfo {
    name: "INA231",
    ..INA226
};

const INA260: VariantInfo = VariantInfo {
    name: "INA260",
    bus_register: reg::BUS_VOLTAGE,
    shunt_register: INA260_CURRENT_REGISTER,
    current_register: Some(INA260_CURRENT_REGISTER),
    power_register: Some(reg::POWER),
    bus_shift: 0,
    shunt_shift: 0,
    bus_scale: Scale::new(125, 100),
    shunt_scale: Scale::new(25, 10),
    calibration: None,
    fixed_lsb: Some((1_250_000, 10_000_000)),
    alerts: true,
    layout: ConfigLayout::Ina226,
    ready: ReadyFlag::MaskEnable,
};

const INA3221: VariantInfo = VariantInfo {
    name: "INA3221",
    bus_register: reg::BUS_VOLTAGE,
    shunt_register: reg::SHUNT_VOLTAGE,
    current_register: None,
    power_register: None,
    bus_shift: 3,
    shunt_shift: 3,
    bus_scale: Scale::new(800, 100),
    shunt_scale: Scale::new(400, 10),
    calibration: None,
    fixed_lsb: None,
    alerts: false,
    layout: ConfigLayout::Ina226,
    ready: ReadyFlag::ChannelMaskEnable,
};

impl Variant {
    /// Constant table entry for this variant
    #[must_use]
    pub fn info(self) -> &'static VariantInfo {
        match self {
            Self::Ina219 => &INA219,
            Self::Ina226 => &INA226,
            Self::Ina230 => &INA230,
            Self::Ina231 => &INA231,
            Self::Ina260 => &INA260,
            Self::Ina3221(_) => &INA3221,
        }
    }

    /// Device name as printed on the package
    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Offset added to the measurement register addresses
    #[must_use]
    pub const fn register_offset(self) -> u8 {
        match self {
            Self::Ina3221(channel) => channel.register_offset(),
            _ => 0,
        }
    }

    /// 4-bit tag used in the persisted record
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Ina219 => 0,
            Self::Ina226 => 1,
            Self::Ina230 => 2,
            Self::Ina231 => 3,
            Self::Ina260 => 4,
            Self::Ina3221(channel) => 5 + channel as u8,
        }
    }

    /// Decode a persisted tag
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Ina219),
            1 => Some(Self::Ina226),
            2 => Some(Self::Ina230),
            3 => Some(Self::Ina231),
            4 => Some(Self::Ina260),
            5 => Some(Self::Ina3221(Channel::First)),
            6 => Some(Self::Ina3221(Channel::Second)),
            7 => Some(Self::Ina3221(Channel::Third)),
            _ => None,
        }
    }

    /// True for the logical channels of a multi-channel part
    #[must_use]
    pub const fn is_multi_channel(self) -> bool {
        matches!(self, Self::Ina3221(_))
    }
}
