//! Tessera - Touch Display Firmware
//!
//! Firmware for ESP32-S3 boards with an RGB or SPI panel and a GT911
//! capacitive touch controller. Brings up the hardware described in
//! `board.toml`, builds the "Hello, World!" scene and then runs the UI
//! from a single cooperative loop:
//!
//! ```text
//! setup:  heap -> config -> pins -> touch + panel -> Context::start
//! loop:   Context::step(now) -> sleep loop_period_ms
//! ```

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Instant, Timer};
use embedded_alloc::LlffHeap as Heap;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::timer::timg::TimerGroup;
use {esp_backtrace as _, esp_println as _};

use tessera_core::buffer::{AllocationFailure, MemoryRegion};
use tessera_core::config::{AllocFailurePolicy, BoardConfig, PanelLayout};
use tessera_core::{Context, SetupError, StartReport};
use tessera_drivers::panel::{Ili9341, RgbPanel};
use tessera_drivers::touch::Gt911;
use tessera_hal::i2c::I2cConfig;
use tessera_hal::spi::{Mode, SpiConfig};
use tessera_hal_esp32s3::memory::DMA_POOL_SIZE;
use tessera_hal_esp32s3::{DpiFrameSink, EspI2c, EspSpi, GpioOutput, MemoryPools, PinBank};

mod config;

esp_bootloader_esp_idf::esp_app_desc!();

// Heap allocator for TOML parsing and UI bookkeeping
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

/// Main entry point
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    init_heap();

    let peripherals =
        esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Tessera UI starting");

    let config = config::load_config();
    let mut pools = init_pools(&peripherals.PSRAM);
    info!(
        "Memory: {} bytes DMA pool, {} bytes PSRAM",
        pools.dma_free(),
        pools.general_free()
    );

    // SAFETY: every GPIO below is taken through this bank, nothing else
    // touches the GPIO singletons of `peripherals`.
    let mut pins = unsafe { PinBank::new() };

    let touch = {
        let sda = unwrap!(pins.take(config.touch.sda));
        let scl = unwrap!(pins.take(config.touch.scl));
        let rst = unwrap!(pins.take_opt(config.touch.rst)).map(|pin| GpioOutput::new(pin, true));
        let i2c = unwrap!(EspI2c::new(
            peripherals.I2C0,
            sda,
            scl,
            I2cConfig {
                frequency: config.touch.frequency_hz,
            },
        ));
        Gt911::new(i2c, rst, Delay::new(), config.touch.address, config.touch.map)
    };

    let backlight = unwrap!(pins.take_opt(config.backlight_pin)).map(|pin| GpioOutput::new(pin, false));

    let mut ctx: Context<'static> = Context::new(config.render);

    let result = match config.panel.layout {
        PanelLayout::Rgb => {
            let rgb = &config.panel.rgb;
            let frame_len = rgb.width as usize * rgb.height as usize * 2;
            match pools.alloc_bytes(MemoryRegion::General, frame_len) {
                Some(frame) => {
                    let sink = unwrap!(DpiFrameSink::new(
                        peripherals.LCD_CAM,
                        peripherals.DMA_CH2,
                        &mut pins,
                        rgb,
                        frame,
                    ));
                    let panel = RgbPanel::new(sink, rgb.width, rgb.height);
                    ctx.start(panel, touch, backlight, &mut pools)
                }
                None => {
                    error!("No memory for the {} byte RGB frame", frame_len);
                    ctx.start_headless();
                    Err(SetupError::Allocation(AllocationFailure {
                        requested: frame_len / 2,
                    }))
                }
            }
        }
        PanelLayout::Spi => {
            let spi_cfg = &config.panel.spi;
            let sck = unwrap!(pins.take(spi_cfg.sck));
            let mosi = unwrap!(pins.take(spi_cfg.mosi));
            let cs = GpioOutput::new(unwrap!(pins.take(spi_cfg.cs)), true);
            let dc = GpioOutput::new(unwrap!(pins.take(spi_cfg.dc)), false);
            let rst = unwrap!(pins.take_opt(spi_cfg.rst)).map(|pin| GpioOutput::new(pin, true));
            let spi = unwrap!(EspSpi::new(
                peripherals.SPI2,
                sck,
                mosi,
                SpiConfig {
                    frequency: spi_cfg.frequency_hz,
                    mode: Mode::Mode0,
                },
            ));
            let panel = Ili9341::new(
                spi,
                dc,
                cs,
                rst,
                Delay::new(),
                spi_cfg.width,
                spi_cfg.height,
                spi_cfg.madctl,
            );
            ctx.start(panel, touch, backlight, &mut pools)
        }
    };

    if report_start(&config, result, &ctx) {
        info!("Setup done");
    }

    let mut reported_errors = 0;
    loop {
        if let Err(e) = ctx.step(Instant::now().as_millis()) {
            warn!("UI tick failed: {}", e);
        }

        let errors = ctx.flush_stats().errors();
        if errors != reported_errors {
            warn!("Panel draw errors: {} (of {} flushes)", errors, ctx.flush_stats().flushes());
            reported_errors = errors;
        }

        Timer::after_millis(ctx.loop_period_ms() as u64).await;
    }
}

/// Log the startup outcome and apply the allocation failure policy
///
/// Returns whether setup completed.
fn report_start(config: &BoardConfig, result: Result<StartReport, SetupError>, ctx: &Context<'_>) -> bool {
    match result {
        Ok(report) => {
            if !report.touch_ok {
                warn!("Touch controller did not respond at {=u8:#04x}", config.touch.address);
            }
            if !report.panel_ok {
                warn!("Panel start-up failed");
            }
            info!(
                "Display {}x{}, draw buffer {} px in {}",
                report.width, report.height, report.buffer_len, report.buffer_region
            );
            true
        }
        Err(SetupError::Allocation(failure)) => {
            error!("draw buffer allocation failed ({} px)", failure.requested);
            if ctx.alloc_failure_policy() == AllocFailurePolicy::Halt {
                error!("Halting");
                halt();
            }
            false
        }
        Err(SetupError::Ui(e)) => {
            error!("Scene setup failed: {}", e);
            false
        }
    }
}

/// Park the CPU for good
fn halt() -> ! {
    let delay = Delay::new();
    loop {
        delay.delay_millis(1000);
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Set up the draw buffer pools
fn init_pools(psram: &esp_hal::peripherals::PSRAM<'_>) -> MemoryPools {
    use core::mem::MaybeUninit;
    static mut DMA_POOL: [MaybeUninit<u8>; DMA_POOL_SIZE] = [MaybeUninit::uninit(); DMA_POOL_SIZE];
    #[allow(static_mut_refs)]
    // SAFETY: called once, so this is the only reference to the pool.
    let region = unsafe { &mut DMA_POOL[..] };
    MemoryPools::init(region, psram)
}
