//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). A future MQTT or BLE
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | controller ready");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::SessionStarted {
                at_ms,
                expires_at_ms,
                condition,
            } => {
                info!(
                    "SESSION | started at t={} | condition={} | expires t={}",
                    at_ms, condition, expires_at_ms
                );
            }
            AppEvent::SessionExtended { expires_at_ms } => {
                info!("SESSION | extended to t={}", expires_at_ms);
            }
            AppEvent::SessionExpired { at_ms } => {
                info!("SESSION | expired at t={}", at_ms);
            }
            AppEvent::WeatherRefreshed(reading) => {
                info!(
                    "WEATHER | refreshed: {} | temp={:?} | precip={:?}",
                    reading.condition, reading.temperature_c, reading.precipitation_probability
                );
            }
            AppEvent::FetchDegraded {
                error,
                stale_condition,
            } => {
                warn!(
                    "WEATHER | fetch failed ({}) | serving stale {}",
                    error, stale_condition
                );
            }
            AppEvent::FetchFailed(error) => {
                warn!("WEATHER | fetch failed ({}) | no cached data", error);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | cached={:?} age={:?}ms | fetches={} | \
                     session_remaining={}ms | ticks={}",
                    t.state,
                    t.cached_condition,
                    t.cache_age_ms,
                    t.fetch_count,
                    t.session_remaining_ms,
                    t.tick_count,
                );
            }
        }
    }
}
