//! ILI9341 TFT controller over SPI
//!
//! The controller keeps its own frame memory. A block is written by setting
//! the column and page address window and streaming RGB565 pixels, high byte
//! first, after a memory-write command.
//!
//! # Wiring
//!
//! - SPI SCK/MOSI (MISO unused)
//! - CS: chip select, active low
//! - DC: low for command bytes, high for parameters and pixel data
//! - RST: optional hardware reset, active low

use embedded_hal::delay::DelayNs;
use tessera_hal::gpio::OutputPin;
use tessera_hal::panel::{ByteOrder, DisplayPanel};
use tessera_hal::spi::SpiBus;

use super::{check_block, PanelError};

/// ILI9341 command bytes
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Page (row) address set
    pub const PASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory access control
    pub const MADCTL: u8 = 0x36;
    /// Pixel format
    pub const COLMOD: u8 = 0x3A;
}

/// 16 bits per pixel on the MCU interface
const COLMOD_RGB565: u8 = 0x55;

/// Pixels converted per SPI write
const CHUNK_PIXELS: usize = 64;

/// ILI9341 driver
pub struct Ili9341<SPI, DC, CS, RST, D> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
    delay: D,
    width: u16,
    height: u16,
    madctl: u8,
}

impl<SPI, DC, CS, RST, D> Ili9341<SPI, DC, CS, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a driver for a `width` x `height` panel
    ///
    /// `madctl` selects rotation and colour order; `width`/`height` must be
    /// the dimensions after that rotation.
    pub fn new(spi: SPI, dc: DC, cs: CS, rst: RST, delay: D, width: u16, height: u16, madctl: u8) -> Self {
        let mut cs = cs;
        cs.set_high();
        Self {
            spi,
            dc,
            cs,
            rst,
            delay,
            width,
            height,
            madctl,
        }
    }

    /// Send a command followed by its parameter bytes
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), PanelError> {
        self.cs.set_low();
        let result = self.command_inner(command, params);
        self.cs.set_high();
        result
    }

    fn command_inner(&mut self, command: u8, params: &[u8]) -> Result<(), PanelError> {
        self.dc.set_low();
        self.spi.write(&[command]).map_err(|_| PanelError::Bus)?;
        if !params.is_empty() {
            self.dc.set_high();
            self.spi.write(params).map_err(|_| PanelError::Bus)?;
        }
        self.spi.flush().map_err(|_| PanelError::Bus)
    }

    /// Set the inclusive drawing window
    fn set_window(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), PanelError> {
        let [xs_hi, xs_lo] = x1.to_be_bytes();
        let [xe_hi, xe_lo] = x2.to_be_bytes();
        self.command(cmd::CASET, &[xs_hi, xs_lo, xe_hi, xe_lo])?;
        let [ys_hi, ys_lo] = y1.to_be_bytes();
        let [ye_hi, ye_lo] = y2.to_be_bytes();
        self.command(cmd::PASET, &[ys_hi, ys_lo, ye_hi, ye_lo])
    }

    fn write_pixels(&mut self, pixels: &[u16], order: ByteOrder) -> Result<(), PanelError> {
        self.cs.set_low();
        let result = self.write_pixels_inner(pixels, order);
        self.cs.set_high();
        result
    }

    fn write_pixels_inner(&mut self, pixels: &[u16], order: ByteOrder) -> Result<(), PanelError> {
        self.dc.set_low();
        self.spi.write(&[cmd::RAMWR]).map_err(|_| PanelError::Bus)?;
        self.dc.set_high();

        let mut bytes = [0u8; CHUNK_PIXELS * 2];
        for chunk in pixels.chunks(CHUNK_PIXELS) {
            for (dst, &word) in bytes.chunks_exact_mut(2).zip(chunk) {
                dst.copy_from_slice(&order.to_be_bytes(word));
            }
            self.spi
                .write(&bytes[..chunk.len() * 2])
                .map_err(|_| PanelError::Bus)?;
        }
        self.spi.flush().map_err(|_| PanelError::Bus)
    }
}

impl<SPI, DC, CS, RST, D> DisplayPanel for Ili9341<SPI, DC, CS, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = PanelError;

    fn begin(&mut self) -> Result<(), PanelError> {
        self.rst.set_low();
        self.delay.delay_ms(10);
        self.rst.set_high();
        self.delay.delay_ms(120);

        self.command(cmd::SWRESET, &[])?;
        self.delay.delay_ms(150);
        self.command(cmd::SLPOUT, &[])?;
        self.delay.delay_ms(120);
        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        let madctl = self.madctl;
        self.command(cmd::MADCTL, &[madctl])?;
        self.command(cmd::DISPON, &[])?;
        self.delay.delay_ms(20);
        Ok(())
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn draw_pixel_block(
        &mut self,
        x: u16,
        y: u16,
        pixels: &[u16],
        w: u16,
        h: u16,
        order: ByteOrder,
    ) -> Result<(), PanelError> {
        check_block(self.width, self.height, x, y, w, h, pixels.len())?;
        self.set_window(x, y, x + w - 1, y + h - 1)?;
        self.write_pixels(&pixels[..w as usize * h as usize], order)
    }
}
