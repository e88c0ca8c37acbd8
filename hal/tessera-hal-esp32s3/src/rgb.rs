//! RGB (DPI) panel output over LCD_CAM
//!
//! The frame lives in PSRAM and is scanned out continuously by a looping DMA
//! transfer started in `begin`, the way an RGB panel expects a steady pixel
//! clock. Drawing writes the frame in place; `present` writes the CPU cache
//! back so the DMA sees the new pixels. Data lines follow the RGB565 layout:
//! D0-D4 blue, D5-D10 green, D11-D15 red.

use esp_hal::dma::{DmaDescriptor, DmaTxBuf, CHUNK_SIZE};
use esp_hal::gpio::Level;
use esp_hal::lcd_cam::lcd::dpi::{Config as DpiConfig, Dpi, DpiTransfer, Format, FrameTiming};
use esp_hal::lcd_cam::lcd::{ClockMode, Phase, Polarity};
use esp_hal::lcd_cam::LcdCam;
use esp_hal::peripherals::{DMA_CH2, LCD_CAM};
use esp_hal::time::Rate;
use esp_hal::Blocking;
use static_cell::StaticCell;

use tessera_core::config::{RgbPanelConfig, SyncTiming};
use tessera_hal::panel::FrameSink;

use crate::pins::{PinBank, PinError};

/// Largest supported frame: 800x480 RGB565
pub const MAX_FRAME_BYTES: usize = 800 * 480 * 2;

const NUM_DESCRIPTORS: usize = MAX_FRAME_BYTES.div_ceil(CHUNK_SIZE);

static DESCRIPTORS: StaticCell<[DmaDescriptor; NUM_DESCRIPTORS]> = StaticCell::new();

extern "C" {
    /// ROM routine writing dirty cache lines of a range back to memory
    fn Cache_WriteBack_Addr(addr: u32, size: u32);
}

/// RGB output setup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgbError {
    Pin(PinError),
    /// Frame larger than [`MAX_FRAME_BYTES`] or not matching the resolution
    FrameSize,
    /// LCD_CAM rejected the timing configuration
    Config,
    /// DMA buffer could not be built over the frame
    Dma,
    /// Transfer failed
    Transfer,
}

impl From<PinError> for RgbError {
    fn from(e: PinError) -> Self {
        RgbError::Pin(e)
    }
}

/// Frame timing for the LCD_CAM peripheral
///
/// Blanking is split into sync pulse, back porch and front porch per axis.
/// The horizontal blank before active data covers pulse plus back porch.
pub fn frame_timing(width: u16, height: u16, hsync: &SyncTiming, vsync: &SyncTiming) -> FrameTiming {
    FrameTiming {
        horizontal_active_width: width as usize,
        horizontal_total_width: (width + hsync.pulse_width + hsync.back_porch + hsync.front_porch) as usize,
        horizontal_blank_front_porch: (hsync.pulse_width + hsync.back_porch) as usize,
        vertical_active_height: height as usize,
        vertical_total_height: (height + vsync.pulse_width + vsync.back_porch + vsync.front_porch) as usize,
        vertical_blank_front_porch: (vsync.pulse_width + vsync.back_porch) as usize,
        hsync_width: hsync.pulse_width as usize,
        vsync_width: vsync.pulse_width as usize,
        hsync_position: 0,
    }
}

fn idle_level(timing: &SyncTiming) -> Level {
    if timing.active_high {
        Level::Low
    } else {
        Level::High
    }
}

/// Scan-out state
enum Scan {
    /// Configured, DMA not running
    Idle(Dpi<'static, Blocking>, DmaTxBuf),
    /// Looping transfer in flight
    Running(DpiTransfer<'static, DmaTxBuf, Blocking>),
    /// Lost after a failed restart
    Broken,
}

/// Full-frame RGB output
pub struct DpiFrameSink {
    scan: Scan,
    /// Frame memory, owned by the DMA buffer inside `scan`
    frame: *mut u8,
    len: usize,
}

impl DpiFrameSink {
    /// Configure LCD_CAM for the panel described by `config`
    ///
    /// `frame` must hold exactly `width * height * 2` bytes. Call once.
    pub fn new(
        lcd_cam: LCD_CAM<'static>,
        channel: DMA_CH2<'static>,
        pins: &mut PinBank,
        config: &RgbPanelConfig,
        frame: &'static mut [u8],
    ) -> Result<Self, RgbError> {
        let frame_len = config.width as usize * config.height as usize * 2;
        if frame.len() != frame_len || frame_len > MAX_FRAME_BYTES {
            return Err(RgbError::FrameSize);
        }

        let clock_mode = if config.pclk_active_neg {
            ClockMode {
                polarity: Polarity::IdleHigh,
                phase: Phase::ShiftHigh,
            }
        } else {
            ClockMode {
                polarity: Polarity::IdleLow,
                phase: Phase::ShiftLow,
            }
        };

        let dpi_config = DpiConfig::default()
            .with_clock_mode(clock_mode)
            .with_frequency(Rate::from_hz(config.pclk_hz))
            .with_format(Format {
                enable_2byte_mode: true,
                ..Default::default()
            })
            .with_timing(frame_timing(
                config.width,
                config.height,
                &config.hsync_timing,
                &config.vsync_timing,
            ))
            .with_hsync_idle_level(idle_level(&config.hsync_timing))
            .with_vsync_idle_level(idle_level(&config.vsync_timing))
            .with_de_idle_level(Level::Low)
            .with_disable_black_region(false);

        let lcd_cam = LcdCam::new(lcd_cam);
        let [b0, b1, b2, b3, b4] = config.blue;
        let [g0, g1, g2, g3, g4, g5] = config.green;
        let [r0, r1, r2, r3, r4] = config.red;

        let dpi = Dpi::new(lcd_cam.lcd, channel, dpi_config)
            .map_err(|_| RgbError::Config)?
            .with_de(pins.take(config.de)?)
            .with_vsync(pins.take(config.vsync)?)
            .with_hsync(pins.take(config.hsync)?)
            .with_pclk(pins.take(config.pclk)?)
            .with_data0(pins.take(b0)?)
            .with_data1(pins.take(b1)?)
            .with_data2(pins.take(b2)?)
            .with_data3(pins.take(b3)?)
            .with_data4(pins.take(b4)?)
            .with_data5(pins.take(g0)?)
            .with_data6(pins.take(g1)?)
            .with_data7(pins.take(g2)?)
            .with_data8(pins.take(g3)?)
            .with_data9(pins.take(g4)?)
            .with_data10(pins.take(g5)?)
            .with_data11(pins.take(r0)?)
            .with_data12(pins.take(r1)?)
            .with_data13(pins.take(r2)?)
            .with_data14(pins.take(r3)?)
            .with_data15(pins.take(r4)?);

        let frame_ptr = frame.as_mut_ptr();
        let descriptors = DESCRIPTORS.init([DmaDescriptor::EMPTY; NUM_DESCRIPTORS]);
        let tx = DmaTxBuf::new(descriptors, frame).map_err(|_| RgbError::Dma)?;

        Ok(Self {
            scan: Scan::Idle(dpi, tx),
            frame: frame_ptr,
            len: frame_len,
        })
    }

    /// Start the looping transfer unless it is already running
    fn start(&mut self) -> Result<(), RgbError> {
        match core::mem::replace(&mut self.scan, Scan::Broken) {
            Scan::Idle(dpi, tx) => match dpi.send(true, tx) {
                Ok(transfer) => {
                    self.scan = Scan::Running(transfer);
                    Ok(())
                }
                Err((_, dpi, tx)) => {
                    self.scan = Scan::Idle(dpi, tx);
                    Err(RgbError::Transfer)
                }
            },
            Scan::Running(transfer) if transfer.is_done() => {
                // A looping transfer only ends on a DMA error; restart it
                let (_, dpi, tx) = transfer.wait();
                self.scan = Scan::Idle(dpi, tx);
                self.start()
            }
            Scan::Running(transfer) => {
                self.scan = Scan::Running(transfer);
                Ok(())
            }
            Scan::Broken => Err(RgbError::Transfer),
        }
    }
}

impl FrameSink for DpiFrameSink {
    type Error = RgbError;

    /// Start continuous scan-out
    fn begin(&mut self) -> Result<(), RgbError> {
        self.start()
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        // SAFETY: `frame` is the 'static allocation handed to the DMA
        // buffer in `new`; it lives as long as `self`. The DMA only reads
        // it, so a concurrent scan sees at worst a partly updated frame.
        unsafe { core::slice::from_raw_parts_mut(self.frame, self.len) }
    }

    /// Make CPU writes visible to the scan-out, restarting it if it stopped
    fn present(&mut self) -> Result<(), RgbError> {
        // SAFETY: ROM routine on a range owned by this sink.
        unsafe { Cache_WriteBack_Addr(self.frame as u32, self.len as u32) }
        self.start()
    }
}
