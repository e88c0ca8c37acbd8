//! Board wiring
//!
//! Pin numbers are raw GPIO numbers of the target chip. The HAL crate for
//! the chip turns them into peripherals at startup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ConfigError, RenderConfig};

/// Which panel the board carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PanelLayout {
    /// 16-bit parallel RGB panel driven from a frame buffer
    #[default]
    Rgb,
    /// SPI controller with its own frame memory (display kit)
    Spi,
}

/// One sync signal of an RGB panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncTiming {
    /// Pulse is active-high
    pub active_high: bool,
    pub front_porch: u16,
    pub pulse_width: u16,
    pub back_porch: u16,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            active_high: false,
            front_porch: 8,
            pulse_width: 4,
            back_porch: 8,
        }
    }
}

/// Parallel RGB panel wiring and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RgbPanelConfig {
    pub width: u16,
    pub height: u16,
    pub de: u8,
    pub vsync: u8,
    pub hsync: u8,
    pub pclk: u8,
    /// R0..R4
    pub red: [u8; 5],
    /// G0..G5
    pub green: [u8; 6],
    /// B0..B4
    pub blue: [u8; 5],
    pub hsync_timing: SyncTiming,
    pub vsync_timing: SyncTiming,
    /// Data is sampled on the falling clock edge
    pub pclk_active_neg: bool,
    pub pclk_hz: u32,
}

impl Default for RgbPanelConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            de: 40,
            vsync: 41,
            hsync: 39,
            pclk: 42,
            red: [45, 48, 47, 21, 14],
            green: [5, 6, 7, 15, 16, 4],
            blue: [8, 3, 46, 9, 1],
            hsync_timing: SyncTiming::default(),
            vsync_timing: SyncTiming::default(),
            pclk_active_neg: true,
            pclk_hz: 16_000_000,
        }
    }
}

/// SPI panel wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpiPanelConfig {
    /// Width after rotation
    pub width: u16,
    /// Height after rotation
    pub height: u16,
    pub sck: u8,
    pub mosi: u8,
    pub cs: u8,
    /// Data/command select
    pub dc: u8,
    pub rst: Option<u8>,
    pub frequency_hz: u32,
    /// Memory access control register value (rotation and BGR order)
    pub madctl: u8,
}

impl Default for SpiPanelConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            sck: 12,
            mosi: 11,
            cs: 10,
            dc: 13,
            rst: Some(14),
            frequency_hz: 40_000_000,
            // Landscape, BGR
            madctl: 0x28,
        }
    }
}

/// Panel selection plus the settings of each layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    pub layout: PanelLayout,
    pub rgb: RgbPanelConfig,
    pub spi: SpiPanelConfig,
}

impl PanelConfig {
    /// Resolution of the selected layout
    pub fn resolution(&self) -> (u16, u16) {
        match self.layout {
            PanelLayout::Rgb => (self.rgb.width, self.rgb.height),
            PanelLayout::Spi => (self.spi.width, self.spi.height),
        }
    }
}

/// Raw touch coordinates to screen coordinates
///
/// Each axis is a linear map from `[raw_min, raw_max]` onto
/// `[screen_min, screen_max]`. A reversed screen range flips the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchMap {
    pub raw_x_min: i32,
    pub raw_x_max: i32,
    pub screen_x_min: i32,
    pub screen_x_max: i32,
    pub raw_y_min: i32,
    pub raw_y_max: i32,
    pub screen_y_min: i32,
    pub screen_y_max: i32,
}

impl Default for TouchMap {
    fn default() -> Self {
        Self::identity(800, 480)
    }
}

impl TouchMap {
    /// Pass-through map for a `width` x `height` screen
    pub const fn identity(width: i32, height: i32) -> Self {
        Self {
            raw_x_min: 0,
            raw_x_max: width - 1,
            screen_x_min: 0,
            screen_x_max: width - 1,
            raw_y_min: 0,
            raw_y_max: height - 1,
            screen_y_min: 0,
            screen_y_max: height - 1,
        }
    }

    /// Map a raw controller point to screen coordinates
    ///
    /// Values outside the raw range extrapolate; nothing is clamped.
    pub fn apply(&self, x: i32, y: i32) -> (i32, i32) {
        (
            map_range(x, self.raw_x_min, self.raw_x_max, self.screen_x_min, self.screen_x_max),
            map_range(y, self.raw_y_min, self.raw_y_max, self.screen_y_min, self.screen_y_max),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.raw_x_min == self.raw_x_max || self.raw_y_min == self.raw_y_max {
            return Err(ConfigError::InvalidTouchMap);
        }
        Ok(())
    }
}

/// Integer linear interpolation, truncating toward zero
fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let span = (in_max - in_min) as i64;
    if span == 0 {
        return out_min;
    }
    let scaled = (value - in_min) as i64 * (out_max - out_min) as i64 / span;
    (scaled + out_min as i64) as i32
}

/// Capacitive touch controller wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchConfig {
    pub sda: u8,
    pub scl: u8,
    /// Reset line; the controller is polled, so there is no interrupt pin
    pub rst: Option<u8>,
    /// 7-bit I2C address
    pub address: u8,
    pub frequency_hz: u32,
    pub map: TouchMap,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            sda: 19,
            scl: 20,
            rst: Some(38),
            address: 0x5D,
            frequency_hz: 400_000,
            map: TouchMap::default(),
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    pub panel: PanelConfig,
    pub touch: TouchConfig,
    /// Backlight enable, driven high after the panel starts
    pub backlight_pin: Option<u8>,
    pub render: RenderConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            touch: TouchConfig::default(),
            backlight_pin: Some(2),
            render: RenderConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a TOML board description
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make startup impossible
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.panel.resolution();
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroResolution);
        }

        let divisor = self.render.buffer_divisor;
        if divisor == 0 || divisor > height as u32 {
            return Err(ConfigError::InvalidDivisor);
        }

        if self.render.loop_period_ms == 0
            || self.render.refresh_period_ms == 0
            || self.render.input_period_ms == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }

        self.touch.map.validate()
    }
}
