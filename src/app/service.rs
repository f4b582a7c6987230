//! Application service — the display controller.
//!
//! [`AppService`] owns the motion gate, the weather cache, and the pattern
//! playback state, and exposes a single `tick` driven by the control loop.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  PresencePort ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                   │        AppService          │
//!  WeatherPort ◀────│  MotionGate · WeatherCache │
//!  LedStripPort ◀───│  PatternPlayer             │
//!                   └───────────────────────────┘
//! ```
//!
//! State machine:
//!
//! ```text
//!  IDLE ──[rising edge]──▶ ACTIVE ──[now ≥ expiry]──▶ IDLE (all-off)
//!              ▲               │
//!              └──[re-edge: extend only, no refetch, no recompute]──┘
//! ```

use log::{info, warn};

use crate::config::DeviceConfig;
use crate::motion::{MotionGate, MotionSignal};
use crate::patterns::{build_frame, error_pattern, pattern_for, PatternPlayer};
use crate::weather::cache::{CacheSource, WeatherCache};

use super::events::{AppEvent, StateId, TelemetryData};
use super::ports::{EventSink, LedStripPort, PresencePort, WeatherPort};

/// The application service orchestrates all domain logic.
pub struct AppService {
    cache: WeatherCache,
    gate: MotionGate,
    /// Playback state for the running session; `None` while idle.
    player: Option<PatternPlayer>,
    state: StateId,

    location: heapless::String<24>,
    api_key: heapless::String<64>,
    led_count: usize,
    brightness: u8,

    /// Set when an all-off write failed; retried every tick until it lands.
    strip_dirty: bool,
    last_tick_ms: Option<u64>,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware — call [`start`](Self::start) next.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            cache: WeatherCache::new(config.cache_ttl_ms),
            gate: MotionGate::new(config.display_hold_ms),
            player: None,
            state: StateId::Idle,
            location: config.location.clone(),
            api_key: config.api_key.clone(),
            led_count: usize::from(config.led_count),
            brightness: config.brightness,
            strip_dirty: false,
            last_tick_ms: None,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Clear the strip and announce startup.
    pub fn start(&mut self, hw: &mut impl LedStripPort, sink: &mut impl EventSink) {
        if let Err(e) = hw.all_off() {
            warn!("startup all-off failed ({e}), will retry");
            self.strip_dirty = true;
        }
        sink.emit(&AppEvent::Started);
        info!("AppService started in {:?}", self.state);
    }

    /// Turn the strip off on shutdown; the device must never power down
    /// with a live frame on it.
    pub fn shutdown(&mut self, hw: &mut impl LedStripPort) {
        self.player = None;
        self.gate.reset();
        self.state = StateId::Idle;
        if let Err(e) = hw.all_off() {
            warn!("shutdown all-off failed ({e})");
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: sample PIR → gate → (fetch) → render.
    ///
    /// The `hw` parameter satisfies all three hardware ports — this avoids
    /// a multi-way mutable borrow while keeping the boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl PresencePort + LedStripPort + WeatherPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_state = self.state;
        let delta_ms = self
            .last_tick_ms
            .map_or(0, |t| now_ms.saturating_sub(t) as u32);
        self.last_tick_ms = Some(now_ms);

        // 1. Sample presence and advance the gate. The weather fetch below
        //    is bounded by the transport's timeout, so even the worst case
        //    never wedges this path for long.
        let present = hw.motion_present();
        let mut fresh_session = false;
        match self.gate.sample(present, now_ms) {
            Some(MotionSignal::Activate) => {
                self.begin_session(now_ms, hw, sink);
                fresh_session = true;
            }
            Some(MotionSignal::Extend) => {
                if let Some(session) = self.gate.session() {
                    info!("session extended to t={}", session.expires_at_ms);
                    sink.emit(&AppEvent::SessionExtended {
                        expires_at_ms: session.expires_at_ms,
                    });
                }
            }
            None => {}
        }

        // 2. Session expiry → idle, strip off.
        if self.gate.poll_expiry(now_ms) {
            self.player = None;
            self.state = StateId::Idle;
            self.strip_dirty = hw.all_off().is_err();
            if self.strip_dirty {
                warn!("all-off failed on expiry, retrying next tick");
            }
            info!("session expired at t={now_ms}");
            sink.emit(&AppEvent::SessionExpired { at_ms: now_ms });
        }

        // 3. Render. A failed write is logged and retried implicitly — the
        //    next tick rebuilds and rewrites the frame anyway. A session
        //    that started this tick renders from phase 0 regardless of how
        //    long the controller sat idle.
        if let Some(player) = &mut self.player {
            let colour = player.tick(if fresh_session { 0 } else { delta_ms });
            let frame = build_frame(colour, self.led_count, self.brightness);
            if let Err(e) = hw.write_frame(&frame) {
                warn!("LED write failed ({e}), retrying next tick");
            }
        } else if self.strip_dirty {
            self.strip_dirty = hw.all_off().is_err();
        }

        // 4. Emit state change if the controller moved.
        if self.state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: self.state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current controller state.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self, now_ms: u64) -> TelemetryData {
        TelemetryData {
            state: self.state,
            cached_condition: self.cache.reading().map(|r| r.condition),
            cache_age_ms: self.cache.fetched_at().map(|t| now_ms.saturating_sub(t)),
            fetch_count: self.cache.fetch_count(),
            session_remaining_ms: self
                .gate
                .session()
                .map_or(0, |s| s.remaining_ms(now_ms)),
            tick_count: self.tick_count,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Entry into `Active`: resolve a condition (cache hit or fetch),
    /// compute the pattern once, start playback. The pattern is never
    /// recomputed mid-session.
    fn begin_session(
        &mut self,
        now_ms: u64,
        hw: &mut impl WeatherPort,
        sink: &mut impl EventSink,
    ) {
        let location = &self.location;
        let api_key = &self.api_key;
        let outcome = self.cache.get(now_ms, || hw.fetch(location, api_key));

        match outcome {
            Ok(resolved) => {
                match resolved.source {
                    CacheSource::Refreshed => {
                        sink.emit(&AppEvent::WeatherRefreshed(resolved.reading));
                    }
                    CacheSource::Cached => {}
                    CacheSource::StaleFallback(e) => {
                        sink.emit(&AppEvent::FetchDegraded {
                            error: e,
                            stale_condition: resolved.reading.condition,
                        });
                    }
                }

                let condition = resolved.reading.condition;
                self.player = Some(PatternPlayer::new(pattern_for(condition)));
                self.state = StateId::Active;

                if let Some(session) = self.gate.session() {
                    info!(
                        "session started: {condition}, expires t={}",
                        session.expires_at_ms
                    );
                    sink.emit(&AppEvent::SessionStarted {
                        at_ms: session.started_at_ms,
                        expires_at_ms: session.expires_at_ms,
                        condition,
                    });
                }
            }
            Err(e) => {
                // No condition available at all: show the defined error
                // pattern for the session rather than an undefined strip.
                warn!("no weather available ({e}), showing error pattern");
                sink.emit(&AppEvent::FetchFailed(e));
                self.player = Some(PatternPlayer::new(error_pattern()));
                self.state = StateId::Active;
            }
        }
    }
}
