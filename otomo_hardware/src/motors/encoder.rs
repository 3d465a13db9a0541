use embedded_hal::digital::InputPin;

use super::PulseInput;

/// Single-channel wheel sensor on a GPIO input.
///
/// A failed read repeats the last known level, so a glitching line never
/// produces a phantom pulse.
pub struct PinPulseInput<P: InputPin> {
    pin: P,
    last_level: bool,
}

impl<P: InputPin> PinPulseInput<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last_level: false,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> PulseInput for PinPulseInput<P> {
    fn level(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => self.last_level = level,
            Err(e) => log::warn!("pulse sensor read failed: {:?}", e),
        }
        self.last_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct ScriptedPin<'a> {
        reads: &'a [Result<bool, ErrorKind>],
        index: usize,
    }

    impl ErrorType for ScriptedPin<'_> {
        type Error = ErrorKind;
    }

    impl InputPin for ScriptedPin<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            let read = self.reads[self.index];
            self.index += 1;
            read
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|h| !h)
        }
    }

    #[test]
    fn reads_follow_pin() {
        let reads = [Ok(true), Ok(false), Ok(true)];
        let mut input = PinPulseInput::new(ScriptedPin {
            reads: &reads,
            index: 0,
        });
        assert!(input.level());
        assert!(!input.level());
        assert!(input.level());
    }

    #[test]
    fn failed_read_repeats_last_level() {
        let reads = [Ok(true), Err(ErrorKind::Other), Ok(false)];
        let mut input = PinPulseInput::new(ScriptedPin {
            reads: &reads,
            index: 0,
        });
        assert!(input.level());
        assert!(input.level());
        assert!(!input.level());
    }
}
