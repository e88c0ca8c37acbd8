//! Blocking I2C and SPI bus adapters

use embedded_hal::i2c::{Error as _, ErrorKind as I2cErrorKind};
use embedded_hal::spi::{Error as _, ErrorKind as SpiErrorKind};
use esp_hal::gpio::AnyPin;
use esp_hal::i2c::master::{Config as EspI2cConfig, I2c};
use esp_hal::peripherals::{I2C0, SPI2};
use esp_hal::spi::master::{Config as EspSpiConfig, Spi};
use esp_hal::spi::Mode as EspMode;
use esp_hal::time::Rate;
use esp_hal::Blocking;

use tessera_hal::i2c::{I2cBus, I2cBusError, I2cConfig};
use tessera_hal::spi::{Mode, SpiBus, SpiConfig};

/// Bus peripheral rejected its configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfigError;

/// I2C0 master
pub struct EspI2c {
    i2c: I2c<'static, Blocking>,
}

impl EspI2c {
    pub fn new(
        i2c: I2C0<'static>,
        sda: AnyPin<'static>,
        scl: AnyPin<'static>,
        config: I2cConfig,
    ) -> Result<Self, BusConfigError> {
        let esp_config = EspI2cConfig::default().with_frequency(Rate::from_hz(config.frequency));
        let i2c = I2c::new(i2c, esp_config)
            .map_err(|_| BusConfigError)?
            .with_sda(sda)
            .with_scl(scl);
        Ok(Self { i2c })
    }
}

fn map_i2c_error(kind: I2cErrorKind) -> I2cBusError {
    match kind {
        I2cErrorKind::Bus => I2cBusError::Bus,
        I2cErrorKind::ArbitrationLoss => I2cBusError::ArbitrationLost,
        I2cErrorKind::NoAcknowledge(_) => I2cBusError::Nack,
        I2cErrorKind::Overrun => I2cBusError::Overrun,
        _ => I2cBusError::Other,
    }
}

impl I2cBus for EspI2c {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cBusError> {
        self.i2c
            .write(address, data)
            .map_err(|e| map_i2c_error(e.kind()))
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cBusError> {
        self.i2c
            .write_read(address, write_data, read_buf)
            .map_err(|e| map_i2c_error(e.kind()))
    }
}

/// SPI2 master, write-only (no MISO)
pub struct EspSpi {
    spi: Spi<'static, Blocking>,
}

impl EspSpi {
    pub fn new(
        spi: SPI2<'static>,
        sck: AnyPin<'static>,
        mosi: AnyPin<'static>,
        config: SpiConfig,
    ) -> Result<Self, BusConfigError> {
        let mode = match config.mode {
            Mode::Mode0 => EspMode::_0,
            Mode::Mode1 => EspMode::_1,
            Mode::Mode2 => EspMode::_2,
            Mode::Mode3 => EspMode::_3,
        };
        let esp_config = EspSpiConfig::default()
            .with_frequency(Rate::from_hz(config.frequency))
            .with_mode(mode);
        let spi = Spi::new(spi, esp_config)
            .map_err(|_| BusConfigError)?
            .with_sck(sck)
            .with_mosi(mosi);
        Ok(Self { spi })
    }
}

impl SpiBus for EspSpi {
    type Error = SpiErrorKind;

    fn write(&mut self, data: &[u8]) -> Result<(), SpiErrorKind> {
        embedded_hal::spi::SpiBus::write(&mut self.spi, data).map_err(|e| e.kind())
    }

    fn flush(&mut self) -> Result<(), SpiErrorKind> {
        embedded_hal::spi::SpiBus::flush(&mut self.spi).map_err(|e| e.kind())
    }
}
