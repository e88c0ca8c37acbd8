//! Digital outputs

use esp_hal::gpio::{AnyPin, Level, Output, OutputConfig};

/// Push-pull output implementing [`tessera_hal::gpio::OutputPin`]
pub struct GpioOutput {
    pin: Output<'static>,
}

impl GpioOutput {
    /// Configure `pin` as an output driven to `high` initially
    pub fn new(pin: AnyPin<'static>, high: bool) -> Self {
        let level = if high { Level::High } else { Level::Low };
        Self {
            pin: Output::new(pin, level, OutputConfig::default()),
        }
    }
}

impl tessera_hal::gpio::OutputPin for GpioOutput {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
