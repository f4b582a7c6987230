//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (PIR input, LED strip, weather transport, event sinks,
//! config storage) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::DeviceConfig;
use crate::error::{FetchError, LedError};
use crate::patterns::Rgb;
use crate::weather::WeatherReading;

// ───────────────────────────────────────────────────────────────
// Presence port (driven adapter: PIR hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain samples this once per control tick.
pub trait PresencePort {
    /// Current boolean presence state of the PIR sensor.
    fn motion_present(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// LED strip port (driven adapter: domain → strip hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain pushes frames through this.
///
/// A failed write is non-fatal by contract — the controller logs it and
/// retries on the next tick; implementations must not block the control
/// loop waiting on the bus.
pub trait LedStripPort {
    /// Push one frame to the strip. `frame.len()` must equal
    /// [`led_count`](Self::led_count).
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<(), LedError>;

    /// Write an all-off frame (safe idle state).
    fn all_off(&mut self) -> Result<(), LedError>;

    /// Number of pixels this strip drives.
    fn led_count(&self) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Weather port (driven adapter: domain → provider transport)
// ───────────────────────────────────────────────────────────────

/// Fetch the current weather for `location` (opaque "lat,lon").
///
/// Called only by the cache, only on miss/staleness. Implementations must
/// bound the request with a timeout of a few seconds; an overrunning fetch
/// surfaces as [`FetchError::Timeout`] rather than stalling the loop.
pub trait WeatherPort {
    fn fetch(&mut self, location: &str, api_key: &str) -> Result<WeatherReading, FetchError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, future
/// MQTT, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists device configuration.
///
/// Implementations MUST validate before persisting — a corrupted blob or a
/// hostile provisioning channel must not be able to zero the cache TTL and
/// turn every activation into an API call.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
