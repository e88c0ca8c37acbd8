//! Tessera Hardware Abstraction Layer
//!
//! This crate defines the hardware traits consumed by the display firmware.
//! Chip-specific crates implement the bus traits, driver crates implement
//! the panel and touch traits on top of them, and `tessera-core` only ever
//! talks to the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tessera-core (bridge, scene, context)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tessera-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌────────────────┐      ┌────────────────┐
//! │ tessera-drivers│      │ tessera-hal-   │
//! │ (panel, touch) │      │    esp32s3     │
//! └────────────────┘      └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (backlight, D/C, reset)
//! - [`i2c::I2cBus`] - I2C bus operations (touch controller)
//! - [`spi::SpiBus`] - SPI bus operations (SPI panels)
//! - [`panel::DisplayPanel`] - Pixel block sink with panel dimensions
//! - [`panel::FrameSink`] - Full-frame scan-out buffer (RGB panels)
//! - [`touch::TouchController`] - Single-point touch polling

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod panel;
pub mod spi;
pub mod touch;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use panel::{ByteOrder, DisplayPanel, FrameSink};
pub use spi::SpiBus;
pub use touch::TouchController;
