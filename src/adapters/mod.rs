//! Driven adapters — concrete implementations of the port traits.
//!
//! Each adapter is dual-target where it touches hardware: the ESP-IDF
//! implementation is guarded by `#[cfg(target_os = "espidf")]` and the host
//! fallback keeps state in memory for tests and simulation.

pub mod darksky;
pub mod log_sink;
pub mod neopixel;
pub mod nvs;
pub mod pir;
pub mod time;

#[cfg(target_os = "espidf")]
pub mod wifi;
