//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, publish somewhere, etc.

use crate::error::FetchError;
use crate::weather::{WeatherCondition, WeatherReading};

/// The two controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateId {
    /// Strip dark, waiting for motion.
    Idle,
    /// A display session is running.
    Active,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// The controller transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Motion started a display session.
    SessionStarted {
        at_ms: u64,
        expires_at_ms: u64,
        condition: WeatherCondition,
    },

    /// Motion during an active session re-armed its expiry.
    SessionExtended { expires_at_ms: u64 },

    /// The session timed out and the strip was turned off.
    SessionExpired { at_ms: u64 },

    /// The fetcher ran and replaced the cache entry.
    WeatherRefreshed(WeatherReading),

    /// The fetcher failed but a stale cached reading was served.
    FetchDegraded {
        error: FetchError,
        stale_condition: WeatherCondition,
    },

    /// The fetcher failed with nothing cached; the error pattern is shown.
    FetchFailed(FetchError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub state: StateId,
    /// Condition currently cached, if any.
    pub cached_condition: Option<WeatherCondition>,
    /// Age of the cache entry in milliseconds, if any.
    pub cache_age_ms: Option<u64>,
    /// Total fetcher invocations since boot.
    pub fetch_count: u64,
    /// Milliseconds left in the running session (0 when idle).
    pub session_remaining_ms: u64,
    /// Total control ticks executed.
    pub tick_count: u64,
}
