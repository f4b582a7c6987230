//! WS2812 ("NeoPixel") strip adapter.
//!
//! Implements [`LedStripPort`]. Frames arrive fully rendered from the
//! core; this adapter only validates the length and pushes the bytes
//! out. The ESP-IDF build drives the strip over the RMT peripheral;
//! the host build records the last written frame for inspection.

use crate::app::ports::LedStripPort;
use crate::error::LedError;
use crate::patterns::Rgb;

// ── Host fallback ─────────────────────────────────────────────

/// In-memory strip for host builds and tests.
#[cfg(not(target_os = "espidf"))]
pub struct NeopixelStrip {
    led_count: u16,
    last_frame: std::vec::Vec<Rgb>,
    write_count: u32,
}

#[cfg(not(target_os = "espidf"))]
impl NeopixelStrip {
    pub fn new(led_count: u16) -> Self {
        Self {
            led_count,
            last_frame: std::vec![(0, 0, 0); led_count as usize],
            write_count: 0,
        }
    }

    /// Last frame handed to the strip.
    pub fn last_frame(&self) -> &[Rgb] {
        &self.last_frame
    }

    pub fn write_count(&self) -> u32 {
        self.write_count
    }
}

#[cfg(not(target_os = "espidf"))]
impl LedStripPort for NeopixelStrip {
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<(), LedError> {
        if frame.len() != self.led_count as usize {
            return Err(LedError::FrameSize);
        }
        self.last_frame.copy_from_slice(frame);
        self.write_count += 1;
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), LedError> {
        self.last_frame.fill((0, 0, 0));
        self.write_count += 1;
        Ok(())
    }

    fn led_count(&self) -> usize {
        self.led_count as usize
    }
}

// ── ESP-IDF RMT driver ────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::NeopixelStrip;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};

    use crate::app::ports::LedStripPort;
    use crate::config::MAX_LED_COUNT;
    use crate::error::LedError;
    use crate::patterns::Rgb;

    // WS2812 timing (ns): T0H/T0L for a 0 bit, T1H/T1L for a 1 bit.
    const T0H_NS: u64 = 350;
    const T0L_NS: u64 = 800;
    const T1H_NS: u64 = 700;
    const T1L_NS: u64 = 600;

    /// WS2812 strip on an RMT TX channel.
    pub struct NeopixelStrip {
        tx: TxRmtDriver<'static>,
        led_count: u16,
        pulses: [(Pulse, Pulse); 2],
    }

    impl NeopixelStrip {
        pub fn new(tx: TxRmtDriver<'static>, led_count: u16) -> Result<Self, LedError> {
            // The transmit signal is statically sized for MAX_LED_COUNT
            // pixels; `DeviceConfig::validate` enforces the same bound.
            if led_count == 0 || led_count > MAX_LED_COUNT {
                return Err(LedError::FrameSize);
            }
            let ticks_hz = tx.counter_clock().map_err(|_| LedError::WriteFailed)?;
            let ns = |nanos| {
                Pulse::new_with_duration(
                    ticks_hz,
                    PinState::High,
                    &core::time::Duration::from_nanos(nanos),
                )
            };
            let ns_low = |nanos| {
                Pulse::new_with_duration(
                    ticks_hz,
                    PinState::Low,
                    &core::time::Duration::from_nanos(nanos),
                )
            };
            let zero = (
                ns(T0H_NS).map_err(|_| LedError::WriteFailed)?,
                ns_low(T0L_NS).map_err(|_| LedError::WriteFailed)?,
            );
            let one = (
                ns(T1H_NS).map_err(|_| LedError::WriteFailed)?,
                ns_low(T1L_NS).map_err(|_| LedError::WriteFailed)?,
            );
            Ok(Self {
                tx,
                led_count,
                pulses: [zero, one],
            })
        }

        fn send(&mut self, frame: &[Rgb]) -> Result<(), LedError> {
            // WS2812 wire order is GRB, MSB first.
            let mut signal = FixedLengthSignal::<{ 24 * MAX_LED_COUNT as usize }>::new();
            let mut slot = 0usize;
            for &(r, g, b) in frame {
                let grb = (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b);
                for bit in (0..24).rev() {
                    let pulse = self.pulses[((grb >> bit) & 1) as usize];
                    signal
                        .set(slot, &pulse)
                        .map_err(|_| LedError::FrameSize)?;
                    slot += 1;
                }
            }
            self.tx
                .start_blocking(&signal)
                .map_err(|_| LedError::WriteFailed)
        }
    }

    impl LedStripPort for NeopixelStrip {
        fn write_frame(&mut self, frame: &[Rgb]) -> Result<(), LedError> {
            if frame.len() != self.led_count as usize {
                return Err(LedError::FrameSize);
            }
            self.send(frame)
        }

        fn all_off(&mut self) -> Result<(), LedError> {
            let off = std::vec![(0, 0, 0); self.led_count as usize];
            self.send(&off)
        }

        fn led_count(&self) -> usize {
            self.led_count as usize
        }
    }
}
