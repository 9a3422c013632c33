//! Mock bus simulating a population of INA devices

use device_driver::RegisterInterface;
use ina::{Bus, BusSpeed};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Records operations performed on the mock bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Address acknowledge check
    Ping {
        /// Addressed device
        address: u8,
    },
    /// Register read
    Read {
        /// Device address
        address: u8,
        /// Register
        register: u8,
        /// Value that was returned
        value: u16,
    },
    /// Register write
    Write {
        /// Device address
        address: u8,
        /// Register
        register: u8,
        /// Value that was written
        value: u16,
    },
    /// Clock change
    Speed {
        /// New rate in Hz
        hz: u32,
    },
}

impl Operation {
    /// Address the operation was sent to, if any
    pub fn address(&self) -> Option<u8> {
        match *self {
            Self::Ping { address } | Self::Read { address, .. } | Self::Write { address, .. } => {
                Some(address)
            }
            Self::Speed { .. } => None,
        }
    }
}

/// Behaviour of a simulated chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipKind {
    /// INA device that loads `signature` into its configuration on reset
    Ina {
        /// Post-reset configuration value
        signature: u16,
    },
    /// Something else that simply stores what is written
    Plain,
}

#[derive(Debug)]
struct MockChip {
    kind: ChipKind,
    registers: HashMap<u8, u16>,
}

impl MockChip {
    fn ina(signature: u16, die_id: u16) -> Self {
        let mut registers = HashMap::new();
        registers.insert(0x00, signature);
        registers.insert(0xFE, 0x5449);
        registers.insert(0xFF, die_id);
        Self {
            kind: ChipKind::Ina { signature },
            registers,
        }
    }

    fn read(&mut self, register: u8) -> u16 {
        let value = self.registers.get(&register).copied().unwrap_or(0);
        if matches!(self.kind, ChipKind::Ina { .. }) && register == 0x06 {
            // Conversion ready flag clears on read
            self.registers.insert(0x06, value & !0x0008);
        }
        value
    }

    fn write(&mut self, register: u8, value: u16) {
        match self.kind {
            ChipKind::Ina { signature } if register == 0x00 => {
                if value & 0x8000 != 0 {
                    self.registers.insert(0x00, signature);
                    self.registers.insert(0x05, 0);
                } else {
                    self.registers.insert(0x00, value);
                }
            }
            _ => {
                self.registers.insert(register, value);
            }
        }
    }
}

/// Shared state for the mock bus
#[derive(Debug, Default)]
struct MockState {
    chips: HashMap<u8, MockChip>,
    selected: u8,
    operations: Vec<Operation>,
    fail_next_read: bool,
    fail_next_write: bool,
    failing_addresses: Vec<u8>,
    speed_hz: Option<u32>,
}

impl MockState {
    fn fails(&self, address: u8) -> bool {
        self.failing_addresses.contains(&address)
    }
}

/// Mock bus for testing
#[derive(Clone, Default)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl MockBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, address: u8, chip: MockChip) -> &Self {
        self.state.borrow_mut().chips.insert(address, chip);
        self
    }

    /// Add an INA219
    pub fn add_ina219(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x399F, 0))
    }

    /// Add an INA226
    pub fn add_ina226(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x4127, 0x2260))
    }

    /// Add an INA230
    pub fn add_ina230(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x4127, 0x3220))
    }

    /// Add an INA231
    pub fn add_ina231(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x4127, 0x0000))
    }

    /// Add an INA260
    pub fn add_ina260(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x6127, 0x2270))
    }

    /// Add an INA3221
    pub fn add_ina3221(&self, address: u8) -> &Self {
        self.add(address, MockChip::ina(0x7127, 0x3220))
    }

    /// Add an INA-like chip with an arbitrary post-reset signature
    pub fn add_unknown(&self, address: u8, signature: u16) -> &Self {
        self.add(address, MockChip::ina(signature, 0))
    }

    /// Add a non-INA chip whose register 0 holds `config`
    pub fn add_plain(&self, address: u8, config: u16) -> &Self {
        let mut registers = HashMap::new();
        registers.insert(0x00, config);
        self.add(
            address,
            MockChip {
                kind: ChipKind::Plain,
                registers,
            },
        )
    }

    /// Set a register value without logging an operation
    pub fn set_register(&self, address: u8, register: u8, value: u16) {
        if let Some(chip) = self.state.borrow_mut().chips.get_mut(&address) {
            chip.registers.insert(register, value);
        }
    }

    /// Get a register value without logging an operation
    pub fn register(&self, address: u8, register: u8) -> u16 {
        self.state
            .borrow()
            .chips
            .get(&address)
            .and_then(|chip| chip.registers.get(&register).copied())
            .unwrap_or(0)
    }

    /// Inject a read failure on the next register read
    pub fn fail_next_read(&self) {
        self.state.borrow_mut().fail_next_read = true;
    }

    /// Inject a write failure on the next register write
    pub fn fail_next_write(&self) {
        self.state.borrow_mut().fail_next_write = true;
    }

    /// Make every register access to `address` fail (the device still acknowledges)
    pub fn fail_address(&self, address: u8) {
        self.state.borrow_mut().failing_addresses.push(address);
    }

    /// Last clock rate requested
    pub fn speed_hz(&self) -> Option<u32> {
        self.state.borrow().speed_hz
    }

    /// Get the operations log
    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    /// Clear the operations log
    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }

    /// Register writes sent to `address`, in order
    pub fn writes_to(&self, address: u8) -> Vec<(u8, u16)> {
        self.state
            .borrow()
            .operations
            .iter()
            .filter_map(|op| match *op {
                Operation::Write {
                    address: a,
                    register,
                    value,
                } if a == address => Some((register, value)),
                _ => None,
            })
            .collect()
    }

    /// Number of operations that touched `address`
    pub fn touches(&self, address: u8) -> usize {
        self.state
            .borrow()
            .operations
            .iter()
            .filter(|op| op.address() == Some(address))
            .count()
    }
}

/// Mock error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Simulated communication error
    Communication,
    /// Nothing acknowledged the address
    Nack,
}

impl RegisterInterface for MockBus {
    type Error = MockError;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();

        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(MockError::Communication);
        }
        let selected = state.selected;
        if state.fails(selected) {
            return Err(MockError::Communication);
        }

        let value = state
            .chips
            .get_mut(&selected)
            .ok_or(MockError::Nack)?
            .read(address);
        read_data.copy_from_slice(&value.to_be_bytes()[..read_data.len()]);

        state.operations.push(Operation::Read {
            address: selected,
            register: address,
            value,
        });
        Ok(())
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();

        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(MockError::Communication);
        }
        let selected = state.selected;
        if state.fails(selected) {
            return Err(MockError::Communication);
        }

        let value = u16::from_be_bytes([write_data[0], write_data[1]]);
        state
            .chips
            .get_mut(&selected)
            .ok_or(MockError::Nack)?
            .write(address, value);

        state.operations.push(Operation::Write {
            address: selected,
            register: address,
            value,
        });
        Ok(())
    }
}

impl Bus for MockBus {
    fn select(&mut self, address: u8) {
        self.state.borrow_mut().selected = address;
    }

    fn acknowledges(&mut self, address: u8) -> bool {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Ping { address });
        state.chips.contains_key(&address)
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(MockError::Communication);
        }
        state.speed_hz = Some(speed.hz());
        state.operations.push(Operation::Speed { hz: speed.hz() });
        Ok(())
    }
}
