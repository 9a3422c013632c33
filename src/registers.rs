//! Register definitions shared by the INA family
//!
//! Only the registers that sit at the same address with the same meaning on
//! every variant that has them are described here. Measurement registers move
//! around between variants (and between INA3221 channels), so those are read
//! as raw words through [`device_driver::RegisterInterface`] using the
//! addresses from [`crate::variant::VariantInfo`].
//!
//! All registers are 16 bits wide and transferred MSB first.

device_driver::create_device!(
    device_name: InaRegisters,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = BE;
        }

        /// CONFIGURATION - Configuration Register (0x00)
        ///
        /// Bits 3-14 are variant specific (gain, range, averaging, conversion
        /// times, INA3221 channel enables).
        register Configuration {
            const ADDRESS = 0x00;
            const SIZE_BITS = 16;

            /// Operating mode (see `OperatingMode`)
            mode: uint = 0..3,
            /// Variant specific settings
            settings: uint = 3..15,
            /// Software reset, self-clearing on INA devices
            reset: bool = 15,
        },

        /// CALIBRATION - Calibration Register (0x05)
        ///
        /// Not present on the INA260 and INA3221.
        register Calibration {
            const ADDRESS = 0x05;
            const SIZE_BITS = 16;

            /// Calibration value
            value: uint = 0..16,
        },

        /// MASK_ENABLE - Alert Configuration and Conversion Ready (0x06)
        ///
        /// INA226, INA230, INA231 and INA260 only.
        register MaskEnable {
            const ADDRESS = 0x06;
            const SIZE_BITS = 16;

            /// Alert latch enable
            latch_enable: bool = 0,
            /// Alert polarity (1 = active high)
            alert_polarity: bool = 1,
            /// Math overflow flag
            math_overflow: bool = 2,
            /// Conversion ready flag, cleared on read
            conversion_ready: bool = 3,
            /// Alert function flag
            alert_function: bool = 4,
            /// Assert alert when a conversion is ready
            conversion_ready_alert: bool = 10,
            /// Power over limit
            power_over: bool = 11,
            /// Bus voltage under limit
            bus_under: bool = 12,
            /// Bus voltage over limit
            bus_over: bool = 13,
            /// Shunt voltage (INA260: current) under limit
            shunt_under: bool = 14,
            /// Shunt voltage (INA260: current) over limit
            shunt_over: bool = 15,
        },

        /// ALERT_LIMIT - Alert Limit (0x07)
        ///
        /// Compared against the register selected in `MaskEnable`, in that
        /// register's counts.
        register AlertLimit {
            const ADDRESS = 0x07;
            const SIZE_BITS = 16;

            /// Limit value
            limit: uint = 0..16,
        },

        /// MASK_ENABLE - INA3221 Mask/Enable (0x0F)
        register ChannelMaskEnable {
            const ADDRESS = 0x0F;
            const SIZE_BITS = 16;

            /// Conversion ready flag
            conversion_ready: bool = 0,
            /// Timing control alert flag
            timing_alert: bool = 1,
            /// Power valid alert flag
            power_valid: bool = 2,
            /// Warning alert flags (channels 1-3)
            warning_flags: uint = 3..6,
            /// Summation alert flag
            summation_flag: bool = 6,
            /// Critical alert flags (channels 1-3)
            critical_flags: uint = 7..10,
            /// Critical alert latch enable
            critical_latch: bool = 10,
            /// Warning alert latch enable
            warning_latch: bool = 11,
            /// Summation channel control
            summation_control: uint = 12..15,
        },

        /// DIE_ID - Die ID (0xFF)
        ///
        /// Used to tell the INA226 (0x2260) from the INA230 and INA231,
        /// which share its post-reset configuration value.
        register DieId {
            const ADDRESS = 0xFF;
            const SIZE_BITS = 16;

            /// Die ID
            id: uint = 0..16,
        }
    }
);

// Re-export commonly used types for convenience
pub use InaRegisters as RegisterDevice;

/// First bit of the `settings` field of the configuration register
pub const SETTINGS_SHIFT: u16 = 3;

/// Assemble a configuration register value from its fields
#[must_use]
pub const fn config_word(mode: u8, settings: u16, reset: bool) -> u16 {
    (mode as u16 & 0x0007) | ((settings << SETTINGS_SHIFT) & 0x7FF8) | ((reset as u16) << 15)
}

/// Split a configuration register value into (mode, settings, reset)
#[must_use]
pub const fn config_fields(word: u16) -> (u8, u16, bool) {
    (
        (word & 0x0007) as u8,
        (word >> SETTINGS_SHIFT) & 0x0FFF,
        word & 0x8000 != 0,
    )
}
