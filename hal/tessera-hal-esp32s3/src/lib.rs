//! ESP32-S3 HAL for the Tessera display firmware
//!
//! This crate binds the `tessera-hal` traits to `esp-hal` peripherals and
//! adds the ESP32-S3 specifics the firmware needs:
//!
//! - GPIO allocation by number for config-driven wiring
//! - Blocking I2C and SPI bus adapters
//! - Memory pools for draw buffers (DMA-capable internal RAM and PSRAM)
//! - LCD_CAM RGB (DPI) frame output

#![no_std]

pub mod bus;
pub mod gpio;
pub mod memory;
pub mod pins;
pub mod rgb;

pub use bus::{EspI2c, EspSpi};
pub use gpio::GpioOutput;
pub use memory::MemoryPools;
pub use pins::{PinBank, PinError};
pub use rgb::DpiFrameSink;
