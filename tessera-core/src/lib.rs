//! Board-agnostic core of the Tessera touch display firmware
//!
//! This crate holds everything between the hardware drivers and the UI
//! library that does not depend on a particular chip:
//!
//! - Board configuration (panel layout, touch wiring, render settings)
//! - Draw buffer allocation with DMA-pool preference
//! - Render bridge: flush and pointer-read adapters
//! - The "Hello World" scene
//! - Startup sequencing and the per-iteration step

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod context;
pub mod scene;

pub use context::{Context, Phase, SetupError, StartReport};
