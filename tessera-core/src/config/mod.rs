//! Configuration types
//!
//! Board configuration is written as TOML (`board.toml` in the firmware
//! crate) and deserialized with serde. Every field has a default matching the
//! 800x480 RGB development board, so a partial file is valid.

pub mod board;
pub mod render;

pub use board::*;
pub use render::*;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML syntax error or a field of the wrong type
    Parse,
    /// Panel width or height is zero
    ZeroResolution,
    /// Buffer divisor is zero or leaves less than one screen row
    InvalidDivisor,
    /// Touch map has an empty raw range on one axis
    InvalidTouchMap,
    /// A period is zero
    ZeroPeriod,
}
