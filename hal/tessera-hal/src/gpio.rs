//! GPIO pin abstractions
//!
//! Only outputs are needed by the display stack: the backlight enable and
//! the data/command and reset lines of SPI panels.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Placeholder for optional pins that are not wired on a board
///
/// Writes are ignored and the pin always reads back low.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl OutputPin for NoPin {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}

    fn is_set_high(&self) -> bool {
        false
    }
}

impl<P: OutputPin> OutputPin for Option<P> {
    fn set_high(&mut self) {
        if let Some(pin) = self {
            pin.set_high();
        }
    }

    fn set_low(&mut self) {
        if let Some(pin) = self {
            pin.set_low();
        }
    }

    fn is_set_high(&self) -> bool {
        self.as_ref().is_some_and(|pin| pin.is_set_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_set_state() {
        let mut pin = Latch(false);
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_optional_pin() {
        let mut missing: Option<Latch> = None;
        missing.set_high();
        assert!(!missing.is_set_high());

        let mut wired = Some(Latch(false));
        wired.set_high();
        assert!(wired.is_set_high());
    }

    #[test]
    fn test_no_pin_reads_low() {
        let mut pin = NoPin;
        pin.set_high();
        assert!(!pin.is_set_high());
    }
}
