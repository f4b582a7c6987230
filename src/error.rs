//! Unified error types for the Nightglow firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be cheaply passed through the controller without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A weather fetch failed at the transport or parse layer.
    Fetch(FetchError),
    /// An LED strip write failed.
    Led(LedError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "fetch: {e}"),
            Self::Led(e) => write!(f, "led: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Weather fetch errors
// ---------------------------------------------------------------------------

/// Failure modes of a weather fetch attempt.
///
/// Transport and parse failures during a refetch are recovered locally by
/// the cache (stale fallback); `NoCachedData` is the only variant the
/// controller ever sees, and it answers it with the error pattern rather
/// than propagating further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Connection could not be established or was dropped mid-transfer.
    Network,
    /// The request exceeded its bounded timeout.
    Timeout,
    /// The response body did not parse as a provider payload.
    MalformedResponse,
    /// The provider answered with a non-2xx status code.
    Http(u16),
    /// A fetch failed and no prior cached reading exists to fall back on.
    NoCachedData,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::Timeout => write!(f, "request timed out"),
            Self::MalformedResponse => write!(f, "malformed response"),
            Self::Http(code) => write!(f, "HTTP {code}"),
            Self::NoCachedData => write!(f, "no cached data available"),
        }
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// LED strip errors
// ---------------------------------------------------------------------------

/// Failure modes of an LED strip write.
///
/// Never fatal: the controller logs the failure and retries on the next
/// scheduling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    /// The transmit peripheral is busy with a previous frame.
    Busy,
    /// The frame write failed at the driver level.
    WriteFailed,
    /// The frame length does not match the configured LED count.
    FrameSize,
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "strip busy"),
            Self::WriteFailed => write!(f, "strip write failed"),
            Self::FrameSize => write!(f, "frame length mismatch"),
        }
    }
}

impl From<LedError> for Error {
    fn from(e: LedError) -> Self {
        Self::Led(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
