//! Unit tests for error handling and recovery

use crate::common::{create_driver, create_scanned_driver, default_params, MockBus, MockDelay, MockError};
use ina::{BusSpeed, Error, OperatingMode, RamStoreError, Target};

#[test]
fn test_read_failure_reported_as_bus_error() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    bus.fail_next_read();
    assert_eq!(
        driver.bus_millivolts(0),
        Err(Error::Bus(MockError::Communication))
    );
}

#[test]
fn test_recovery_after_read_failure() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);
    bus.set_register(0x40, 0x02, 0x0C80);

    bus.fail_next_read();
    assert!(driver.bus_millivolts(0).is_err());
    assert_eq!(driver.bus_millivolts(0).unwrap(), 4000);
}

#[test]
fn test_write_failure_during_mode_change() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, stats) = create_scanned_driver(&bus);
    let writes = stats.borrow().writes;

    bus.fail_next_write();
    assert_eq!(
        driver.set_mode(Target::Device(0), OperatingMode::Shutdown),
        Err(Error::Bus(MockError::Communication))
    );
    // Record is only updated once the device accepted the mode
    assert_eq!(stats.borrow().writes, writes);
    assert_eq!(driver.mode(0).unwrap(), OperatingMode::ContinuousBoth);
}

#[test]
fn test_conversion_poll_failure_propagates() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);

    bus.fail_next_read();
    let mut delay = MockDelay::default();
    assert_eq!(
        driver.wait_for_conversion(Target::All, &mut delay),
        Err(Error::Bus(MockError::Communication))
    );
}

#[test]
fn test_failing_address_skipped_during_scan() {
    let bus = MockBus::new();
    bus.add_ina226(0x40).add_ina226(0x41).add_ina226(0x42);
    bus.fail_address(0x41);

    let (mut driver, _) = create_scanned_driver(&bus);

    assert_eq!(driver.device_count(), 2);
    assert_eq!(driver.device_address(0).unwrap(), 0x40);
    assert_eq!(driver.device_address(1).unwrap(), 0x42);
}

#[test]
fn test_failed_reset_write_skips_device() {
    let bus = MockBus::new();
    bus.add_ina219(0x40).add_ina260(0x41);
    // The first write of the scan is the reset of 0x40
    bus.fail_next_write();

    let (mut driver, _) = create_scanned_driver(&bus);

    assert_eq!(driver.device_count(), 1);
    assert_eq!(driver.device_address(0).unwrap(), 0x41);
    assert_eq!(bus.register(0x40, 0x00), 0x399F);
}

#[test]
fn test_store_failure_aborts_scan() {
    let bus = MockBus::new();
    bus.add_ina226(0x40).add_ina226(0x41);
    let (mut driver, stats) = create_driver::<96>(&bus);
    stats.borrow_mut().fail_next_write = true;

    assert_eq!(
        driver.begin(default_params(), Target::All),
        Err(Error::Storage(RamStoreError::OutOfBounds))
    );
    assert_eq!(driver.device_count(), 0);
    assert_eq!(bus.touches(0x41), 0);
}

#[test]
fn test_store_failure_on_record_update() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, stats) = create_scanned_driver(&bus);

    stats.borrow_mut().fail_next_write = true;
    assert_eq!(
        driver.set_mode(Target::Device(0), OperatingMode::TriggeredBoth),
        Err(Error::Storage(RamStoreError::OutOfBounds))
    );
    // The device is put back on the stored mode
    assert_eq!(driver.mode(0).unwrap(), OperatingMode::ContinuousBoth);
    assert_eq!(bus.register(0x40, 0x00) & 0x0007, 0x0007);

    driver.set_mode(Target::Device(0), OperatingMode::TriggeredBoth).unwrap();
    assert_eq!(driver.mode(0).unwrap(), OperatingMode::TriggeredBoth);
    assert_eq!(bus.register(0x40, 0x00) & 0x0007, 0x0003);
}

#[test]
fn test_i2c_speed() {
    let bus = MockBus::new();
    bus.add_ina226(0x40);
    let (mut driver, _) = create_scanned_driver(&bus);
    assert_eq!(bus.speed_hz(), None);

    driver.set_i2c_speed(BusSpeed::Fast).unwrap();
    assert_eq!(bus.speed_hz(), Some(400_000));

    bus.fail_next_write();
    assert_eq!(
        driver.set_i2c_speed(BusSpeed::FastPlus),
        Err(Error::Bus(MockError::Communication))
    );
    assert_eq!(bus.speed_hz(), Some(400_000));
}

#[test]
fn test_reset_restores_calibration_and_mode() {
    let bus = MockBus::new();
    bus.add_ina226(0x40).add_ina219(0x41);
    let (mut driver, _) = create_scanned_driver(&bus);
    driver.set_mode(Target::All, OperatingMode::Shutdown).unwrap();

    driver.reset(Target::All).unwrap();

    assert_eq!(bus.register(0x40, 0x00), 0x4127);
    assert_eq!(bus.register(0x40, 0x05), 1_677);
    assert_eq!(bus.register(0x41, 0x00), 0x319F);
    assert_eq!(bus.register(0x41, 0x05), 13_421);
    assert_eq!(driver.mode(0).unwrap(), OperatingMode::ContinuousBoth);
    assert_eq!(driver.mode(1).unwrap(), OperatingMode::ContinuousBoth);
}
