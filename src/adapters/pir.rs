//! PIR motion sensor adapter.
//!
//! [`PirSampler`] wraps any `embedded-hal` input pin and implements
//! [`PresencePort`] by level-sampling the line. On ESP-IDF the pin is
//! additionally subscribed to a rising-edge ISR that latches into
//! [`motion_latched`] so a short pulse between control ticks is not
//! missed; the main loop turns the latch into a queued event.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::PresencePort;

/// Set from the GPIO ISR on a rising edge, cleared by the main loop.
static MOTION_LATCH: AtomicBool = AtomicBool::new(false);

/// Latch a rising edge. ISR-safe (single atomic store).
pub fn latch_motion() {
    MOTION_LATCH.store(true, Ordering::Release);
}

/// Take the latched edge, clearing it.
pub fn motion_latched() -> bool {
    MOTION_LATCH.swap(false, Ordering::AcqRel)
}

/// Level-sampling presence adapter over an `embedded-hal` input pin.
pub struct PirSampler<P> {
    pin: P,
    read_failures: u32,
}

impl<P: InputPin> PirSampler<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            read_failures: 0,
        }
    }

    /// Number of pin reads that returned an error (treated as no motion).
    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }

    /// Access the underlying pin, e.g. to re-arm its interrupt after the
    /// ISR fired.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: InputPin> PresencePort for PirSampler<P> {
    fn motion_present(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(_) => {
                self.read_failures = self.read_failures.saturating_add(1);
                if self.read_failures == 1 {
                    warn!("pir: pin read failed, reporting no motion");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakePin {
        level: bool,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.level)
        }
    }

    #[test]
    fn samples_pin_level() {
        let mut sampler = PirSampler::new(FakePin { level: false });
        assert!(!sampler.motion_present());

        sampler.pin.level = true;
        assert!(sampler.motion_present());
        assert_eq!(sampler.read_failures(), 0);
    }

    #[test]
    fn latch_is_consumed_once() {
        assert!(!motion_latched());
        latch_motion();
        assert!(motion_latched());
        assert!(!motion_latched());
    }
}
