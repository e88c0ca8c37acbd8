//! Default theme
//!
//! One fixed light theme: white screen, dark text, blue buttons.

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

/// Colors and metrics used by the renderer
#[derive(Clone, Copy)]
pub struct Theme {
    /// Screen background
    pub background: Rgb565,
    /// Text on the screen background
    pub text: Rgb565,
    /// Button fill
    pub primary: Rgb565,
    /// Button fill while pressed
    pub primary_pressed: Rgb565,
    /// Text placed on a button
    pub on_primary: Rgb565,
    /// Font for all labels
    pub font: &'static MonoFont<'static>,
    /// Horizontal padding inside buttons
    pub pad_hor: u32,
    /// Vertical padding inside buttons
    pub pad_ver: u32,
    /// Button corner radius
    pub radius: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb565::WHITE,
            text: Rgb565::new(4, 8, 4),
            // Material blue 500 (#2196F3) and a darker pressed shade
            primary: Rgb565::new(4, 37, 30),
            primary_pressed: Rgb565::new(2, 26, 22),
            on_primary: Rgb565::WHITE,
            font: &FONT_10X20,
            pad_hor: 16,
            pad_ver: 10,
            radius: 8,
        }
    }
}
