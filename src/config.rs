//! Device configuration.
//!
//! Everything that parameterises a Nightglow unit: network credentials,
//! geolocation, provider API key, cache TTL, hardware wiring, and display
//! timing. Built once at startup and passed by reference into adapters;
//! the core logic consumes only `cache_ttl_ms`, `display_hold_ms`,
//! `led_count`, and `brightness`.

use heapless::String;
use serde::{Deserialize, Serialize};

/// Largest strip the LED driver can address. The RMT transmit signal is
/// statically sized for this many pixels, so `validate` rejects anything
/// bigger rather than letting every frame write fail at runtime.
pub const MAX_LED_COUNT: u16 = 64;

/// Immutable device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Network (adapter-only) ---
    /// WiFi network name.
    pub ssid: String<32>,
    /// WiFi passphrase.
    pub password: String<64>,

    // --- Weather provider (adapter-only) ---
    /// "lat,lon" string, passed opaquely to the fetch adapter.
    pub location: String<24>,
    /// Provider API key, opaque credential.
    pub api_key: String<64>,
    /// Maximum age of a cached weather reading (milliseconds).
    pub cache_ttl_ms: u64,

    // --- Hardware wiring (adapter-only) ---
    /// GPIO wired to the PIR sensor output.
    pub pin_pir: i32,
    /// GPIO wired to the NeoPixel data line.
    pub pin_pixel: i32,
    /// Number of pixels on the strip (1..=[`MAX_LED_COUNT`]).
    pub led_count: u16,

    // --- Display ---
    /// How long the strip stays lit after the last motion edge (milliseconds).
    pub display_hold_ms: u64,
    /// Global brightness scale (0-255) applied when building frames.
    pub brightness: u8,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Credentials are provisioned; empty until then.
            ssid: String::new(),
            password: String::new(),
            location: String::new(),
            api_key: String::new(),

            // One hour — weather does not change faster than that.
            cache_ttl_ms: 60 * 60 * 1000,

            pin_pir: 4,
            pin_pixel: 5,
            led_count: 16,

            display_hold_ms: 30_000,
            brightness: 160,

            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 60,   // 1/min
        }
    }
}

impl DeviceConfig {
    /// Range-check the numeric fields.
    ///
    /// Called by `ConfigPort` implementations before persisting, so a
    /// corrupted or injected config can never zero out the cache TTL or
    /// the display hold.
    pub fn validate(&self) -> core::result::Result<(), &'static str> {
        if self.cache_ttl_ms == 0 {
            return Err("cache_ttl_ms must be non-zero");
        }
        if self.display_hold_ms == 0 {
            return Err("display_hold_ms must be non-zero");
        }
        if self.led_count == 0 {
            return Err("led_count must be non-zero");
        }
        if self.led_count > MAX_LED_COUNT {
            return Err("led_count exceeds driver capacity");
        }
        if self.control_loop_interval_ms == 0 {
            return Err("control_loop_interval_ms must be non-zero");
        }
        if self.display_hold_ms < u64::from(self.control_loop_interval_ms) {
            return Err("display_hold_ms shorter than one control tick");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = DeviceConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.cache_ttl_ms >= 60_000, "sub-minute TTL would hammer the API");
        assert!(c.display_hold_ms >= 1_000);
        assert!(c.led_count > 0);
        assert!(c.control_loop_interval_ms > 0);
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut c = DeviceConfig::default();
        c.cache_ttl_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_led_count() {
        let mut c = DeviceConfig::default();
        c.led_count = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_enforces_driver_led_cap() {
        // A count past the driver's static signal size would make every
        // frame write fail; it must be rejected up front instead.
        let mut c = DeviceConfig::default();
        c.led_count = MAX_LED_COUNT;
        assert!(c.validate().is_ok());
        c.led_count = MAX_LED_COUNT + 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_hold_below_tick() {
        let mut c = DeviceConfig::default();
        c.display_hold_ms = 50;
        c.control_loop_interval_ms = 100;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let mut c = DeviceConfig::default();
        c.location = String::try_from("40.74857,-73.9879617").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let c2: DeviceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.location, c2.location);
        assert_eq!(c.cache_ttl_ms, c2.cache_ttl_ms);
        assert_eq!(c.led_count, c2.led_count);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = DeviceConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: DeviceConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.display_hold_ms, c2.display_hold_ms);
        assert_eq!(c.brightness, c2.brightness);
    }
}
