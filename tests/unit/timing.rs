//! Unit tests for averaging and conversion time settings

use crate::common::{create_scanned_driver, MockBus};
use ina::{OperatingMode, Target};

#[test]
fn test_ina226_averaging() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    driver.set_averaging(Target::Device(0), 64).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x4727);

    // 100 rounds down to 64
    driver.set_averaging(Target::Device(0), 100).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x4727);

    driver.set_averaging(Target::Device(0), 1).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x4127);
}

#[test]
fn test_ina226_conversion_times() {
    let bus = MockBus::new();
    bus.add_ina260(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    driver.set_bus_conversion(Target::All, 8244).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x61E7);

    driver.set_shunt_conversion(Target::All, 140).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x61C7);

    // Mode bits survive
    assert_eq!(bus.register(0x40, 0x00) & 0x0007, 0x0007);
}

#[test]
fn test_ina219_averaging_switches_both_adcs() {
    let bus = MockBus::new();
    bus.add_ina219(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);
    assert_eq!(bus.register(0x40, 0x00), 0x319F);

    driver.set_averaging(Target::Device(0), 128).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x37FF);
}

#[test]
fn test_ina219_conversion_times_are_independent() {
    let bus = MockBus::new();
    bus.add_ina219(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    // 9-bit bus ADC, shunt ADC left at 12 bits
    driver.set_bus_conversion(Target::Device(0), 84).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x301F);

    // 16 samples on the shunt ADC
    driver.set_shunt_conversion(Target::Device(0), 8_510).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x3067);
}

#[test]
fn test_broadcast_uses_each_layout() {
    let bus = MockBus::new();
    bus.add_ina219(0x40).add_ina226(0x41);
    let (mut driver, _) = create_scanned_driver(&bus);

    driver.set_averaging(Target::All, 16).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x3667);
    assert_eq!(bus.register(0x41, 0x00), 0x4527);
}

#[test]
fn test_ina3221_channels_share_configuration() {
    let bus = MockBus::new();
    bus.add_ina3221(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    driver.set_averaging(Target::Device(2), 4).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x7327);
    driver.set_bus_conversion(Target::Device(0), 8244).unwrap();
    assert_eq!(bus.register(0x40, 0x00), 0x73E7);
}

#[test]
fn test_settings_leave_mode_untouched() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);
    driver.set_mode(Target::Device(0), OperatingMode::TriggeredShunt).unwrap();

    bus.clear_operations();
    driver.set_averaging(Target::Device(0), 1024).unwrap();

    assert_eq!(bus.writes_to(0x40), vec![(0x00, 0x4F21)]);
}
