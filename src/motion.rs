//! Motion gate — PIR edge detection and display-session tracking.
//!
//! Raw PIR samples arrive at the control loop's tick rate. The gate turns
//! them into discrete signals:
//!
//! - rising edge, no active session → [`MotionSignal::Activate`] and a new
//!   session expiring at `now + hold_ms`
//! - rising edge, session active → [`MotionSignal::Extend`], the expiry is
//!   re-armed, and nothing downstream refetches or recomputes
//! - falling edges are ignored; PIR outputs are unreliable going low right
//!   after motion, so sessions end purely by timeout

use log::debug;

/// A bounded display interval. Zero or one exists at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySession {
    pub started_at_ms: u64,
    pub expires_at_ms: u64,
}

impl DisplaySession {
    /// Active for all t in `[started_at, expires_at)`.
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }

    /// Milliseconds until expiry (0 once expired).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}

/// Discrete signal produced by a qualifying rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSignal {
    /// Start a new display session.
    Activate,
    /// Re-arm the expiry of the running session.
    Extend,
}

/// Debounces the raw presence stream into activation signals and owns the
/// session lifetime.
pub struct MotionGate {
    hold_ms: u64,
    /// Previous presence sample; `None` until the first sample arrives, so
    /// an initially-high PIR line still counts as a rising edge.
    last_sample: Option<bool>,
    session: Option<DisplaySession>,
}

impl MotionGate {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            last_sample: None,
            session: None,
        }
    }

    /// Feed one presence sample. At most one signal per rising edge.
    pub fn sample(&mut self, present: bool, now_ms: u64) -> Option<MotionSignal> {
        let rising = present && !self.last_sample.unwrap_or(false);
        self.last_sample = Some(present);

        if !rising {
            return None;
        }

        match self.session {
            Some(s) if s.is_active(now_ms) => {
                let extended = DisplaySession {
                    started_at_ms: s.started_at_ms,
                    expires_at_ms: now_ms + self.hold_ms,
                };
                self.session = Some(extended);
                debug!("motion: session extended to t={}", extended.expires_at_ms);
                Some(MotionSignal::Extend)
            }
            _ => {
                let session = DisplaySession {
                    started_at_ms: now_ms,
                    expires_at_ms: now_ms + self.hold_ms,
                };
                self.session = Some(session);
                debug!(
                    "motion: session started at t={}, expires t={}",
                    session.started_at_ms, session.expires_at_ms
                );
                Some(MotionSignal::Activate)
            }
        }
    }

    /// Whether a session is active at `now_ms`.
    pub fn is_session_active(&self, now_ms: u64) -> bool {
        self.session.is_some_and(|s| s.is_active(now_ms))
    }

    /// Clear an expired session. Returns `true` exactly once, on the tick
    /// where expiry is observed.
    pub fn poll_expiry(&mut self, now_ms: u64) -> bool {
        match self.session {
            Some(s) if !s.is_active(now_ms) => {
                debug!("motion: session expired at t={}", now_ms);
                self.session = None;
                true
            }
            _ => false,
        }
    }

    /// The running session, if any (expired sessions linger until
    /// [`poll_expiry`](Self::poll_expiry) observes them).
    pub fn session(&self) -> Option<&DisplaySession> {
        self.session.as_ref()
    }

    /// Drop any session and forget the sample history, e.g. on shutdown.
    pub fn reset(&mut self) {
        self.session = None;
        self.last_sample = None;
    }
}
