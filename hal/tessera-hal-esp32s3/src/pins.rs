//! Dynamic pin allocation for config-driven hardware setup
//!
//! Board wiring comes from `board.toml` as raw GPIO numbers, so pins are
//! handed out by number at runtime. The bank tracks which pins were taken
//! and refuses numbers that do not exist or that the module wires to flash
//! and PSRAM.

use esp_hal::gpio::AnyPin;

/// Highest GPIO number on the ESP32-S3
const MAX_GPIO: u8 = 48;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// No such GPIO on this chip
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin wired to SPI flash or octal PSRAM
    Reserved(u8),
}

/// Check a GPIO number against the ESP32-S3 pin map
///
/// GPIO 22-25 do not exist. GPIO 26-32 carry the SPI flash and GPIO 33-37
/// the octal PSRAM on modules with 8 MB PSRAM.
pub const fn check_pin(num: u8) -> Result<(), PinError> {
    match num {
        22..=25 => Err(PinError::InvalidPin(num)),
        26..=37 => Err(PinError::Reserved(num)),
        n if n > MAX_GPIO => Err(PinError::InvalidPin(num)),
        _ => Ok(()),
    }
}

/// Pin bank handing out GPIOs by number
///
/// Owns the right to create every GPIO driver; create exactly one bank and
/// take all configured pins through it.
pub struct PinBank {
    taken: u64,
}

impl PinBank {
    /// Create the pin bank
    ///
    /// # Safety
    ///
    /// The caller must not create GPIO drivers for any pin through other
    /// means (for example directly from `Peripherals`) while the bank
    /// exists, and must create only one bank.
    pub unsafe fn new() -> Self {
        Self { taken: 0 }
    }

    /// Take a pin by number
    pub fn take(&mut self, num: u8) -> Result<AnyPin<'static>, PinError> {
        check_pin(num)?;
        let bit = 1u64 << num;
        if self.taken & bit != 0 {
            return Err(PinError::AlreadyTaken(num));
        }
        self.taken |= bit;
        // SAFETY: the number is a valid GPIO and the bank hands each
        // number out once.
        Ok(unsafe { AnyPin::steal(num) })
    }

    /// Take an optional pin
    pub fn take_opt(&mut self, num: Option<u8>) -> Result<Option<AnyPin<'static>>, PinError> {
        num.map(|n| self.take(n)).transpose()
    }

    /// Check if a pin is available
    pub fn is_available(&self, num: u8) -> bool {
        check_pin(num).is_ok() && self.taken & (1u64 << num) == 0
    }
}
