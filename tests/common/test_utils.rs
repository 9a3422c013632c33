//! Test utilities and helper functions

use crate::common::mock_bus::MockBus;
use ina::{CalibrationParams, InaDriver, RamStore, RamStoreError, RecordStore, Target};
use std::cell::RefCell;
use std::rc::Rc;

/// Mock delay implementation for testing
///
/// Does not sleep, but remembers how long it was asked to wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDelay {
    /// Total requested delay in ns
    pub elapsed_ns: u64,
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_ns += u64::from(us) * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns += u64::from(ms) * 1_000_000;
    }
}

/// Access counters of a [`CountingStore`]
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Number of `read` calls
    pub reads: usize,
    /// Number of `write` calls
    pub writes: usize,
    /// Fail the next write
    pub fail_next_write: bool,
    /// Return erased bytes from every read
    pub erased: bool,
}

/// Record store that counts accesses, sharing its counters with the test
pub struct CountingStore<const N: usize> {
    inner: RamStore<N>,
    stats: Rc<RefCell<StoreStats>>,
}

impl<const N: usize> CountingStore<N> {
    /// Create an erased store and a handle to its counters
    pub fn new() -> (Self, Rc<RefCell<StoreStats>>) {
        let stats = Rc::new(RefCell::new(StoreStats::default()));
        (
            Self {
                inner: RamStore::new(),
                stats: Rc::clone(&stats),
            },
            stats,
        )
    }
}

impl<const N: usize> RecordStore for CountingStore<N> {
    type Error = RamStoreError;

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let mut stats = self.stats.borrow_mut();
        stats.reads += 1;
        self.inner.read(offset, buf)?;
        if stats.erased {
            buf.fill(0xFF);
        }
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let mut stats = self.stats.borrow_mut();
        stats.writes += 1;
        if stats.fail_next_write {
            stats.fail_next_write = false;
            return Err(RamStoreError::OutOfBounds);
        }
        self.inner.write(offset, data)
    }
}

/// Driver under test with a store of `N` bytes
pub type TestDriver<const N: usize> = InaDriver<MockBus, CountingStore<N>>;

/// Create a driver on `bus` with a store of `N` bytes
///
/// Returns (driver, store counters); the bus keeps sharing state with the driver.
pub fn create_driver<const N: usize>(bus: &MockBus) -> (TestDriver<N>, Rc<RefCell<StoreStats>>) {
    let (store, stats) = CountingStore::<N>::new();
    (InaDriver::new(bus.clone(), store), stats)
}

/// Create a driver on `bus` and run the scan with 1 A / 0.1 Ω
pub fn create_scanned_driver(bus: &MockBus) -> (TestDriver<96>, Rc<RefCell<StoreStats>>) {
    let (mut driver, stats) = create_driver::<96>(bus);
    driver
        .begin(default_params(), Target::All)
        .expect("Scan failed");
    (driver, stats)
}

/// 1 A through a 0.1 Ω shunt
pub fn default_params() -> CalibrationParams {
    CalibrationParams::new(1, 100_000).expect("valid parameters")
}
