//! Dark Sky weather provider adapter.
//!
//! Two halves:
//! - [`parse_payload`] — pure payload normalization: provider JSON →
//!   [`WeatherReading`]. Host-testable, fuzzed.
//! - `DarkSkyClient` (ESP-IDF only) — HTTPS transport implementing
//!   [`WeatherPort`](crate::app::ports::WeatherPort) with a bounded
//!   request timeout.
//!
//! The provider's `currently.icon` string vocabulary collapses into
//! [`WeatherCondition`]; unrecognized icons become `Unknown`, which still
//! renders.

use serde::Deserialize;

use crate::error::FetchError;
use crate::weather::{WeatherCondition, WeatherReading};

/// Request timeout for the provider round trip.
pub const FETCH_TIMEOUT_MS: u32 = 5_000;

// ── Payload normalization (pure) ──────────────────────────────

#[derive(Deserialize)]
struct ForecastResponse {
    currently: Option<Currently>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Currently {
    icon: Option<std::string::String>,
    temperature: Option<f32>,
    precip_probability: Option<f32>,
}

/// Normalize a provider response body into a [`WeatherReading`].
pub fn parse_payload(body: &str) -> Result<WeatherReading, FetchError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|_| FetchError::MalformedResponse)?;
    let currently = response.currently.ok_or(FetchError::MalformedResponse)?;

    let condition = currently
        .icon
        .as_deref()
        .map_or(WeatherCondition::Unknown, condition_from_icon);

    Ok(WeatherReading {
        condition,
        temperature_c: currently.temperature,
        precipitation_probability: currently.precip_probability,
    })
}

/// Map the provider icon vocabulary to a normalized condition.
fn condition_from_icon(icon: &str) -> WeatherCondition {
    match icon {
        "clear-day" | "clear-night" => WeatherCondition::Clear,
        "cloudy" | "partly-cloudy-day" | "partly-cloudy-night" | "wind" => {
            WeatherCondition::Cloudy
        }
        "rain" => WeatherCondition::Rain,
        "snow" | "sleet" => WeatherCondition::Snow,
        "thunderstorm" | "hail" | "tornado" => WeatherCondition::Storm,
        "fog" => WeatherCondition::Fog,
        _ => WeatherCondition::Unknown,
    }
}

// ── HTTPS transport (ESP-IDF only) ────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::DarkSkyClient;

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use esp_idf_svc::http::Method;
    use log::warn;

    use crate::app::ports::WeatherPort;
    use crate::error::FetchError;
    use crate::weather::WeatherReading;

    use super::{parse_payload, FETCH_TIMEOUT_MS};

    /// Provider response bodies are ~1-2 KiB with the exclude filter.
    const BODY_CAP: usize = 4096;

    /// HTTPS client for the Dark Sky forecast endpoint.
    pub struct DarkSkyClient;

    impl DarkSkyClient {
        pub fn new() -> Self {
            Self
        }

        fn request(&self, url: &str) -> Result<std::string::String, FetchError> {
            let mut conn = EspHttpConnection::new(&Configuration {
                timeout: Some(Duration::from_millis(u64::from(FETCH_TIMEOUT_MS))),
                crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
                ..Default::default()
            })
            .map_err(|_| FetchError::Network)?;

            conn.initiate_request(Method::Get, url, &[])
                .map_err(|_| FetchError::Network)?;
            conn.initiate_response().map_err(|e| {
                warn!("darksky: response failed: {e}");
                FetchError::Timeout
            })?;

            let status = conn.status();
            if !(200..300).contains(&status) {
                return Err(FetchError::Http(status));
            }

            let mut body = std::vec::Vec::with_capacity(1024);
            let mut buf = [0u8; 256];
            loop {
                match conn.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if body.len() + n > BODY_CAP {
                            return Err(FetchError::MalformedResponse);
                        }
                        body.extend_from_slice(&buf[..n]);
                    }
                    Err(_) => return Err(FetchError::Network),
                }
            }

            std::string::String::from_utf8(body).map_err(|_| FetchError::MalformedResponse)
        }
    }

    impl WeatherPort for DarkSkyClient {
        fn fetch(
            &mut self,
            location: &str,
            api_key: &str,
        ) -> Result<WeatherReading, FetchError> {
            let url = std::format!(
                "https://api.darksky.net/forecast/{api_key}/{location}\
                 ?exclude=minutely,hourly,daily,alerts&units=si"
            );
            let body = self.request(&url)?;
            parse_payload(&body)
        }
    }
}
