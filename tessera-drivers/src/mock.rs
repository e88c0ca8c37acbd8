//! Recording bus and pin doubles for driver tests

extern crate std;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use tessera_hal::gpio::OutputPin;
use tessera_hal::i2c::{I2cBus, I2cBusError};
use tessera_hal::spi::SpiBus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Pin(&'static str, bool),
    Spi(Vec<u8>),
}

/// Shared operation log
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Op>>>);

impl Log {
    fn push(&self, op: Op) {
        self.0.borrow_mut().push(op);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().clone()
    }

    /// Last level driven on pin `name`
    pub fn last_pin(&self, name: &str) -> Option<bool> {
        self.0.borrow().iter().rev().find_map(|op| match op {
            Op::Pin(n, level) if *n == name => Some(*level),
            _ => None,
        })
    }

    /// SPI traffic grouped as (command, data) using the DC line
    pub fn commands(&self) -> Vec<(u8, Vec<u8>)> {
        let mut dc = false;
        let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
        for op in self.0.borrow().iter() {
            match op {
                Op::Pin("dc", level) => dc = *level,
                Op::Spi(bytes) if !dc => {
                    for &b in bytes {
                        out.push((b, Vec::new()));
                    }
                }
                Op::Spi(bytes) => {
                    if let Some((_, data)) = out.last_mut() {
                        data.extend_from_slice(bytes);
                    }
                }
                _ => {}
            }
        }
        out
    }
}

pub struct MockPin {
    log: Log,
    name: &'static str,
    level: bool,
}

impl MockPin {
    pub fn new(log: &Log, name: &'static str) -> Self {
        Self {
            log: log.clone(),
            name,
            level: false,
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.level = true;
        self.log.push(Op::Pin(self.name, true));
    }

    fn set_low(&mut self) {
        self.level = false;
        self.log.push(Op::Pin(self.name, false));
    }

    fn is_set_high(&self) -> bool {
        self.level
    }
}

pub struct MockSpi {
    log: Log,
    pub fail: bool,
}

impl MockSpi {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail: false,
        }
    }
}

impl SpiBus for MockSpi {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.log.push(Op::Spi(data.to_vec()));
        Ok(())
    }
}

pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// I2C device with a 16-bit register space
#[derive(Default)]
pub struct MockI2c {
    pub regs: BTreeMap<u16, u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub nack: bool,
}

impl MockI2c {
    pub fn set(&mut self, reg: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.regs.insert(reg + i as u16, b);
        }
    }

    pub fn get(&self, reg: u16) -> u8 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }
}

impl I2cBus for MockI2c {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cBusError> {
        if self.nack {
            return Err(I2cBusError::Nack);
        }
        self.writes.push((address, data.to_vec()));
        if data.len() > 2 {
            let reg = u16::from_be_bytes([data[0], data[1]]);
            self.set(reg, &data[2..]);
        }
        Ok(())
    }

    fn write_read(&mut self, _address: u8, write_data: &[u8], read_buf: &mut [u8]) -> Result<(), I2cBusError> {
        if self.nack {
            return Err(I2cBusError::Nack);
        }
        let reg = u16::from_be_bytes([write_data[0], write_data[1]]);
        for (i, b) in read_buf.iter_mut().enumerate() {
            *b = self.get(reg + i as u16);
        }
        Ok(())
    }
}
