//! Weather domain types and the TTL-gated cache.

pub mod cache;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Normalized weather condition.
///
/// The provider's icon vocabulary collapses into this set; anything the
/// adapter does not recognise becomes `Unknown`, which still renders (dim
/// white) rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
    Fog,
    Unknown,
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "storm",
            Self::Fog => "fog",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A point-in-time weather reading, immutable once produced.
///
/// The auxiliary fields are carried for telemetry; the render mapping keys
/// off `condition` alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub condition: WeatherCondition,
    /// Air temperature in degrees Celsius, when the provider supplied one.
    pub temperature_c: Option<f32>,
    /// Precipitation probability 0.0-1.0, when the provider supplied one.
    pub precipitation_probability: Option<f32>,
}

impl WeatherReading {
    /// A reading with only a condition (auxiliary fields absent).
    pub fn from_condition(condition: WeatherCondition) -> Self {
        Self {
            condition,
            temperature_c: None,
            precipitation_probability: None,
        }
    }
}
