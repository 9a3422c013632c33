//! Persisted per-device record
//!
//! Every device in the table is stored as a fixed 6-byte little-endian word:
//!
//! | Bits    | Field             |
//! |---------|-------------------|
//! | 0..4    | variant tag       |
//! | 4..8    | operating mode    |
//! | 8..15   | I2C address       |
//! | 15..25  | maximum amps      |
//! | 25..45  | shunt resistance (µΩ) |
//! | 45..48  | zero              |
//!
//! The layout is the same for every variant, so record `i` always lives at
//! byte offset `i * RECORD_SIZE` in the store.

use crate::variant::Variant;
use crate::{MAX_BUS_AMPS, MAX_SHUNT_MICRO_OHMS};

/// Size of one serialized record in bytes
pub const RECORD_SIZE: usize = 6;

const TAG_SHIFT: u32 = 0;
const MODE_SHIFT: u32 = 4;
const ADDRESS_SHIFT: u32 = 8;
const AMPS_SHIFT: u32 = 15;
const SHUNT_SHIFT: u32 = 25;

const TAG_MASK: u64 = 0x0F;
const MODE_MASK: u64 = 0x0F;
const ADDRESS_MASK: u64 = 0x7F;
const AMPS_MASK: u64 = 0x3FF;
const SHUNT_MASK: u64 = 0xF_FFFF;

/// Operating mode, bits 0-2 of the configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Shutdown
    Shutdown = 0,
    /// Single shunt voltage conversion
    TriggeredShunt = 1,
    /// Single bus voltage conversion
    TriggeredBus = 2,
    /// Single shunt and bus conversion
    TriggeredBoth = 3,
    /// Power-down (ADC off)
    PowerDown = 4,
    /// Continuous shunt voltage conversions
    ContinuousShunt = 5,
    /// Continuous bus voltage conversions
    ContinuousBus = 6,
    /// Continuous shunt and bus conversions (power-on default)
    #[default]
    ContinuousBoth = 7,
}

impl OperatingMode {
    /// Register bits for this mode
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode the low three bits of a configuration value
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Shutdown,
            1 => Self::TriggeredShunt,
            2 => Self::TriggeredBus,
            3 => Self::TriggeredBoth,
            4 => Self::PowerDown,
            5 => Self::ContinuousShunt,
            6 => Self::ContinuousBus,
            _ => Self::ContinuousBoth,
        }
    }

    /// Single-shot mode: each conversion has to be started by a config write
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        let bits = self as u8;
        bits & 0b100 == 0 && bits & 0b011 != 0
    }

    /// Bus voltage is converted in this mode
    #[must_use]
    pub const fn bus_enabled(self) -> bool {
        self as u8 & 0b010 != 0
    }

    /// Shunt voltage is converted in this mode
    #[must_use]
    pub const fn shunt_enabled(self) -> bool {
        self as u8 & 0b001 != 0
    }
}

/// The persisted part of a device's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceRecord {
    /// Chip variant (and channel for the INA3221)
    pub variant: Variant,
    /// Last requested operating mode
    pub mode: OperatingMode,
    /// 7-bit I2C address
    pub address: u8,
    /// Expected maximum bus current in amps
    pub max_amps: u16,
    /// Shunt resistance in µΩ
    pub shunt_micro_ohms: u32,
}

impl DeviceRecord {
    /// Create a record, clamping the values to their stored widths
    #[must_use]
    pub fn new(variant: Variant, address: u8, max_amps: u16, shunt_micro_ohms: u32) -> Self {
        Self {
            variant,
            mode: OperatingMode::ContinuousBoth,
            address: address & 0x7F,
            max_amps: max_amps.min(MAX_BUS_AMPS),
            shunt_micro_ohms: shunt_micro_ohms.min(MAX_SHUNT_MICRO_OHMS),
        }
    }

    /// Serialize to the fixed-width store format
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let word = (u64::from(self.variant.tag()) & TAG_MASK) << TAG_SHIFT
            | (u64::from(self.mode.bits()) & MODE_MASK) << MODE_SHIFT
            | (u64::from(self.address) & ADDRESS_MASK) << ADDRESS_SHIFT
            | (u64::from(self.max_amps.min(MAX_BUS_AMPS)) & AMPS_MASK) << AMPS_SHIFT
            | (u64::from(self.shunt_micro_ohms.min(MAX_SHUNT_MICRO_OHMS)) & SHUNT_MASK)
                << SHUNT_SHIFT;

        let bytes = word.to_le_bytes();
        let mut out = [0u8; RECORD_SIZE];
        out.copy_from_slice(&bytes[..RECORD_SIZE]);
        out
    }

    /// Deserialize from the store format
    ///
    /// Returns `None` for an unknown variant tag or mode value.
    #[must_use]
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Option<Self> {
        let mut raw = [0u8; 8];
        raw[..RECORD_SIZE].copy_from_slice(bytes);
        let word = u64::from_le_bytes(raw);

        let variant = Variant::from_tag(((word >> TAG_SHIFT) & TAG_MASK) as u8)?;
        let mode_bits = ((word >> MODE_SHIFT) & MODE_MASK) as u8;
        if mode_bits > 7 {
            return None;
        }

        Some(Self {
            variant,
            mode: OperatingMode::from_bits(mode_bits),
            address: ((word >> ADDRESS_SHIFT) & ADDRESS_MASK) as u8,
            max_amps: ((word >> AMPS_SHIFT) & AMPS_MASK) as u16,
            shunt_micro_ohms: ((word >> SHUNT_SHIFT) & SHUNT_MASK) as u32,
        })
    }
}
