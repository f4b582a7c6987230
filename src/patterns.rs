//! Render patterns — the condition → colour mapping and playback engine.
//!
//! A [`RenderPattern`] is a finite, fixed-capacity sequence of
//! `(colour, hold_ms)` steps that loops for the lifetime of a display
//! session. [`pattern_for`] is the exhaustive mapping table: every
//! [`WeatherCondition`] variant has a pattern, enforced by `match`
//! exhaustiveness — adding a variant without a mapping fails to compile.
//!
//! [`PatternPlayer`] advances a phase by `delta_ms` per control tick and
//! yields the colour of the current step, wrapping at the pattern length.

use heapless::Vec;

use crate::weather::WeatherCondition;

/// Colour as (R, G, B) tuple, each 0-255.
pub type Rgb = (u8, u8, u8);

/// Upper bound on steps per pattern (stack-allocated).
pub const MAX_PATTERN_STEPS: usize = 8;

/// One step of a pattern: hold `colour` for `hold_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternStep {
    pub colour: Rgb,
    pub hold_ms: u32,
}

const fn step(colour: Rgb, hold_ms: u32) -> PatternStep {
    PatternStep { colour, hold_ms }
}

/// An ordered, timed, looping colour sequence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPattern {
    steps: Vec<PatternStep, MAX_PATTERN_STEPS>,
}

impl RenderPattern {
    fn from_steps(steps: &[PatternStep]) -> Self {
        let mut v = Vec::new();
        for s in steps {
            if v.push(*s).is_err() {
                debug_assert!(false, "pattern exceeds MAX_PATTERN_STEPS");
                break;
            }
        }
        Self { steps: v }
    }

    fn solid(colour: Rgb) -> Self {
        Self::from_steps(&[step(colour, 1000)])
    }

    pub fn steps(&self) -> &[PatternStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step holds — the loop period.
    pub fn total_ms(&self) -> u32 {
        self.steps.iter().map(|s| s.hold_ms).sum()
    }
}

// ── Condition colours ─────────────────────────────────────────

pub const COLOUR_CLEAR: Rgb = (255, 170, 40); // warm sunlight
pub const COLOUR_CLOUDY: Rgb = (120, 130, 155); // grey-blue overcast
pub const COLOUR_RAIN: Rgb = (20, 80, 255); // saturated blue
pub const COLOUR_SNOW: Rgb = (200, 220, 255); // cold white
pub const COLOUR_STORM: Rgb = (110, 40, 220); // violet
pub const COLOUR_FOG: Rgb = (90, 90, 100); // muted grey
pub const COLOUR_UNKNOWN: Rgb = (60, 60, 60); // dim white — neutral fallback
pub const COLOUR_ERROR: Rgb = (255, 0, 0); // red

// ── Mapping table ─────────────────────────────────────────────

/// Map a condition to its pattern. Total and side-effect-free; produces a
/// fresh pattern per call so playback state never aliases the table.
pub fn pattern_for(condition: WeatherCondition) -> RenderPattern {
    match condition {
        WeatherCondition::Clear => RenderPattern::solid(COLOUR_CLEAR),
        WeatherCondition::Cloudy => RenderPattern::solid(COLOUR_CLOUDY),
        // Rain: slow two-tone pulse, like drops swelling.
        WeatherCondition::Rain => RenderPattern::from_steps(&[
            step(COLOUR_RAIN, 900),
            step((10, 40, 140), 600),
        ]),
        WeatherCondition::Snow => RenderPattern::solid(COLOUR_SNOW),
        // Storm: violet base with short white flashes.
        WeatherCondition::Storm => RenderPattern::from_steps(&[
            step(COLOUR_STORM, 1400),
            step((255, 255, 255), 120),
            step(COLOUR_STORM, 700),
            step((255, 255, 255), 80),
        ]),
        WeatherCondition::Fog => RenderPattern::solid(COLOUR_FOG),
        WeatherCondition::Unknown => RenderPattern::solid(COLOUR_UNKNOWN),
    }
}

/// Pattern rendered when no condition could be resolved at all: a red
/// heartbeat, unmistakably not a weather colour.
pub fn error_pattern() -> RenderPattern {
    RenderPattern::from_steps(&[step(COLOUR_ERROR, 400), step((40, 0, 0), 400)])
}

// ── Playback ──────────────────────────────────────────────────

/// Loops a pattern, yielding the colour of the step the phase falls in.
pub struct PatternPlayer {
    pattern: RenderPattern,
    phase_ms: u32,
}

impl PatternPlayer {
    pub fn new(pattern: RenderPattern) -> Self {
        Self {
            pattern,
            phase_ms: 0,
        }
    }

    /// Advance by `delta_ms` and return the current colour.
    pub fn tick(&mut self, delta_ms: u32) -> Rgb {
        let total = self.pattern.total_ms();
        if total == 0 {
            return (0, 0, 0);
        }
        self.phase_ms = (self.phase_ms.wrapping_add(delta_ms)) % total;

        let mut acc = 0u32;
        for s in self.pattern.steps() {
            acc += s.hold_ms;
            if self.phase_ms < acc {
                return s.colour;
            }
        }
        // phase < total guarantees a hit above; fall back to the last step
        self.pattern
            .steps()
            .last()
            .map_or((0, 0, 0), |s| s.colour)
    }

    pub fn reset(&mut self) {
        self.phase_ms = 0;
    }

    pub fn pattern(&self) -> &RenderPattern {
        &self.pattern
    }
}

// ── Frame building ────────────────────────────────────────────

/// Scale a colour by `brightness` (0-255 global dimming).
pub fn scale(colour: Rgb, brightness: u8) -> Rgb {
    let (r, g, b) = colour;
    let br = u16::from(brightness);
    (
        ((u16::from(r) * br) / 255) as u8,
        ((u16::from(g) * br) / 255) as u8,
        ((u16::from(b) * br) / 255) as u8,
    )
}

/// A full strip frame: one colour per pixel. Heap-allocated because
/// `led_count` is a runtime config value.
pub type Frame = std::vec::Vec<Rgb>;

/// Build a uniform frame of `led_count` pixels at the given brightness.
pub fn build_frame(colour: Rgb, led_count: usize, brightness: u8) -> Frame {
    std::vec![scale(colour, brightness); led_count]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_total_and_non_empty() {
        for condition in [
            WeatherCondition::Clear,
            WeatherCondition::Cloudy,
            WeatherCondition::Rain,
            WeatherCondition::Snow,
            WeatherCondition::Storm,
            WeatherCondition::Fog,
            WeatherCondition::Unknown,
        ] {
            let p = pattern_for(condition);
            assert!(!p.is_empty(), "{condition} must map to a pattern");
            assert!(p.total_ms() > 0, "{condition} pattern must have duration");
        }
    }

    #[test]
    fn unknown_maps_to_dim_white() {
        let p = pattern_for(WeatherCondition::Unknown);
        assert_eq!(p.steps()[0].colour, COLOUR_UNKNOWN);
    }

    #[test]
    fn error_pattern_is_red_and_non_empty() {
        let p = error_pattern();
        assert!(!p.is_empty());
        assert_eq!(p.steps()[0].colour, COLOUR_ERROR);
    }

    #[test]
    fn player_holds_step_then_advances() {
        // rain: 900ms of COLOUR_RAIN, then 600ms of the darker tone
        let mut player = PatternPlayer::new(pattern_for(WeatherCondition::Rain));
        assert_eq!(player.tick(0), COLOUR_RAIN);
        assert_eq!(player.tick(800), COLOUR_RAIN);
        assert_eq!(player.tick(200), (10, 40, 140)); // phase 1000
    }

    #[test]
    fn player_loops() {
        let mut player = PatternPlayer::new(pattern_for(WeatherCondition::Rain));
        let total = player.pattern().total_ms();
        assert_eq!(player.tick(total), player.tick(total));
        assert_eq!(player.tick(0), COLOUR_RAIN);
    }

    #[test]
    fn player_of_empty_pattern_is_black() {
        let mut player = PatternPlayer::new(RenderPattern::from_steps(&[]));
        assert_eq!(player.tick(100), (0, 0, 0));
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(scale((255, 128, 0), 255), (255, 128, 0));
        assert_eq!(scale((255, 128, 0), 0), (0, 0, 0));
        assert_eq!(scale((200, 100, 50), 128), (100, 50, 25));
    }

    #[test]
    fn build_frame_is_uniform_and_sized() {
        let frame = build_frame(COLOUR_RAIN, 16, 255);
        assert_eq!(frame.len(), 16);
        assert!(frame.iter().all(|&c| c == COLOUR_RAIN));
    }
}
