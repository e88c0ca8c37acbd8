//! Hardware driver implementations
//!
//! Concrete implementations of the `tessera-hal` panel and touch traits:
//!
//! - ILI9341 SPI panel (display kit)
//! - Parallel RGB panel scanning out of a frame buffer
//! - GT911 capacitive touch controller

#![no_std]
#![deny(unsafe_code)]

pub mod panel;
pub mod touch;

#[cfg(test)]
mod mock;
