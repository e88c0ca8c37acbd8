//! GT911 capacitive touch controller (I2C)
//!
//! Registers are addressed with 16-bit big-endian indices. The controller
//! sets bit 7 of the status register when a new sample is ready, with the
//! number of touch points in the low nibble. The host clears the register
//! after reading so the next sample can be latched.
//!
//! Only the first touch point is used.

use embedded_hal::delay::DelayNs;
use tessera_core::config::TouchMap;
use tessera_hal::gpio::OutputPin;
use tessera_hal::i2c::I2cBus;
use tessera_hal::touch::TouchController;

/// Default 7-bit address (INT held low during reset)
pub const DEFAULT_ADDRESS: u8 = 0x5D;
/// Alternate address (INT held high during reset)
pub const ALT_ADDRESS: u8 = 0x14;

/// GT911 register addresses
pub mod reg {
    /// Product ID, 4 ASCII bytes ("911\0")
    pub const PRODUCT_ID: u16 = 0x8140;
    /// Buffer status and touch count
    pub const STATUS: u16 = 0x814E;
    /// First touch point: track id, x lo/hi, y lo/hi, size lo/hi
    pub const POINT1: u16 = 0x814F;
}

/// Status register: sample ready
const STATUS_READY: u8 = 0x80;
/// Status register: touch count
const STATUS_COUNT_MASK: u8 = 0x0F;

/// GT911 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gt911Error {
    /// I2C transfer failed
    Bus,
    /// Product ID does not read back as a GT911
    NotFound,
}

/// Decoded status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub ready: bool,
    pub points: u8,
}

impl Status {
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            ready: raw & STATUS_READY != 0,
            points: raw & STATUS_COUNT_MASK,
        }
    }
}

/// Decode x/y from the first four coordinate bytes of a point record
pub const fn decode_point(bytes: [u8; 4]) -> (i32, i32) {
    (
        u16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        u16::from_le_bytes([bytes[2], bytes[3]]) as i32,
    )
}

/// GT911 driver
pub struct Gt911<I2C, RST, D> {
    i2c: I2C,
    rst: RST,
    delay: D,
    address: u8,
    map: TouchMap,
    touched: bool,
    last_point: (i32, i32),
}

impl<I2C, RST, D> Gt911<I2C, RST, D>
where
    I2C: I2cBus,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(i2c: I2C, rst: RST, delay: D, address: u8, map: TouchMap) -> Self {
        Self {
            i2c,
            rst,
            delay,
            address,
            map,
            touched: false,
            last_point: (0, 0),
        }
    }

    fn read(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), Gt911Error> {
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), buf)
            .map_err(|_| Gt911Error::Bus)
    }

    fn write(&mut self, reg: u16, value: u8) -> Result<(), Gt911Error> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .map_err(|_| Gt911Error::Bus)
    }

    /// Read the product ID
    pub fn product_id(&mut self) -> Result<[u8; 4], Gt911Error> {
        let mut id = [0u8; 4];
        self.read(reg::PRODUCT_ID, &mut id)?;
        Ok(id)
    }

    /// Latch the current sample
    ///
    /// Updates the touched flag and, when a point is present, the last
    /// point. The status register is cleared whenever a sample was ready.
    pub fn poll(&mut self) -> Result<Status, Gt911Error> {
        let mut raw = [0u8; 1];
        self.read(reg::STATUS, &mut raw)?;
        let status = Status::from_raw(raw[0]);
        if !status.ready {
            return Ok(status);
        }

        self.touched = status.points > 0;
        if self.touched {
            let mut point = [0u8; 5];
            self.read(reg::POINT1, &mut point)?;
            let (x, y) = decode_point([point[1], point[2], point[3], point[4]]);
            self.last_point = self.map.apply(x, y);
        }
        self.write(reg::STATUS, 0)?;
        Ok(status)
    }
}

impl<I2C, RST, D> TouchController for Gt911<I2C, RST, D>
where
    I2C: I2cBus,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = Gt911Error;

    fn init(&mut self) -> Result<(), Gt911Error> {
        self.rst.set_low();
        self.delay.delay_ms(10);
        self.rst.set_high();
        self.delay.delay_ms(50);

        let id = self.product_id()?;
        if &id[..3] != b"911" {
            return Err(Gt911Error::NotFound);
        }
        self.write(reg::STATUS, 0)
    }

    /// The controller is polled, there is no interrupt line to check
    fn has_signal(&mut self) -> bool {
        true
    }

    fn is_touched(&mut self) -> bool {
        // A failed read keeps the previous state
        let _ = self.poll();
        self.touched
    }

    fn is_released(&mut self) -> bool {
        !self.touched
    }

    fn last_point(&self) -> (i32, i32) {
        self.last_point
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{MockDelay, MockI2c};
    use proptest::prelude::*;
    use tessera_hal::gpio::NoPin;

    fn driver(i2c: MockI2c) -> Gt911<MockI2c, NoPin, MockDelay> {
        Gt911::new(i2c, NoPin, MockDelay, DEFAULT_ADDRESS, TouchMap::identity(800, 480))
    }

    fn with_point(x: u16, y: u16) -> MockI2c {
        let mut i2c = MockI2c::default();
        let [xl, xh] = x.to_le_bytes();
        let [yl, yh] = y.to_le_bytes();
        i2c.set(reg::STATUS, &[0x81]);
        i2c.set(reg::POINT1, &[0, xl, xh, yl, yh]);
        i2c
    }

    #[test]
    fn test_status_decoding() {
        assert_eq!(Status::from_raw(0x81), Status { ready: true, points: 1 });
        assert_eq!(Status::from_raw(0x80), Status { ready: true, points: 0 });
        assert_eq!(Status::from_raw(0x05), Status { ready: false, points: 5 });
    }

    #[test]
    fn test_init_checks_product_id() {
        let mut i2c = MockI2c::default();
        i2c.set(reg::PRODUCT_ID, b"911\0");
        assert_eq!(driver(i2c).init(), Ok(()));

        let mut i2c = MockI2c::default();
        i2c.set(reg::PRODUCT_ID, b"xyz\0");
        assert_eq!(driver(i2c).init(), Err(Gt911Error::NotFound));

        let i2c = MockI2c {
            nack: true,
            ..Default::default()
        };
        assert_eq!(driver(i2c).init(), Err(Gt911Error::Bus));
    }

    #[test]
    fn test_touch_reads_point_and_clears_status() {
        let mut touch = driver(with_point(400, 240));
        assert!(touch.has_signal());
        assert!(touch.is_touched());
        assert!(!touch.is_released());
        assert_eq!(touch.last_point(), (400, 240));
        assert_eq!(touch.i2c.get(reg::STATUS), 0);
        assert_eq!(touch.i2c.writes.last(), Some(&(DEFAULT_ADDRESS, std::vec![0x81, 0x4E, 0])));
    }

    #[test]
    fn test_not_ready_keeps_state() {
        let mut touch = driver(with_point(10, 20));
        assert!(touch.is_touched());
        // Status cleared by the previous read: no new sample
        assert!(touch.is_touched());
        assert_eq!(touch.last_point(), (10, 20));

        touch.i2c.set(reg::STATUS, &[0x80]);
        assert!(!touch.is_touched());
        assert!(touch.is_released());
        assert_eq!(touch.last_point(), (10, 20));
    }

    #[test]
    fn test_coordinates_are_mapped() {
        let map = TouchMap {
            screen_x_min: 799,
            screen_x_max: 0,
            ..TouchMap::identity(800, 480)
        };
        let mut touch = Gt911::new(with_point(0, 100), NoPin, MockDelay, DEFAULT_ADDRESS, map);
        assert!(touch.is_touched());
        assert_eq!(touch.last_point(), (799, 100));
    }

    proptest! {
        #[test]
        fn prop_point_decoding(x: u16, y: u16) {
            let [xl, xh] = x.to_le_bytes();
            let [yl, yh] = y.to_le_bytes();
            prop_assert_eq!(decode_point([xl, xh, yl, yh]), (x as i32, y as i32));
        }
    }
}
