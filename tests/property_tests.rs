//! Property-based tests for the domain core.
//!
//! Random activation timelines and fetch outcomes, checked against the
//! invariants the controller depends on: the fetcher only runs on a
//! stale cache, sessions never outlive the hold window, and playback
//! only ever emits colours the pattern actually contains.

use proptest::collection::vec;
use proptest::prelude::*;

use nightglow::error::FetchError;
use nightglow::motion::MotionGate;
use nightglow::patterns::{pattern_for, scale, PatternPlayer, Rgb};
use nightglow::weather::cache::WeatherCache;
use nightglow::weather::{WeatherCondition, WeatherReading};

const ALL_CONDITIONS: [WeatherCondition; 7] = [
    WeatherCondition::Clear,
    WeatherCondition::Cloudy,
    WeatherCondition::Rain,
    WeatherCondition::Snow,
    WeatherCondition::Storm,
    WeatherCondition::Fog,
    WeatherCondition::Unknown,
];

proptest! {
    /// The fetcher is invoked exactly when the entry is missing or its
    /// age has reached the TTL — never on a fresh hit.
    #[test]
    fn cache_fetches_only_when_stale(
        ttl in 1u64..100_000,
        steps in vec((0u64..50_000, any::<bool>()), 1..60),
    ) {
        let mut cache = WeatherCache::new(ttl);
        let mut now = 0u64;

        for (advance, success) in steps {
            now += advance;
            let expect_fetch = !cache.is_fresh(now);
            let fetched_at_before = cache.fetched_at();

            let mut invoked = false;
            let result = cache.get(now, || {
                invoked = true;
                if success {
                    Ok(WeatherReading::from_condition(WeatherCondition::Clear))
                } else {
                    Err(FetchError::Network)
                }
            });

            prop_assert_eq!(invoked, expect_fetch);

            if invoked {
                if success {
                    prop_assert_eq!(cache.fetched_at(), Some(now));
                } else {
                    // Failure never touches the timestamp, and only errors
                    // out when there was nothing to fall back to.
                    prop_assert_eq!(cache.fetched_at(), fetched_at_before);
                    prop_assert_eq!(result.is_err(), fetched_at_before.is_none());
                }
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(cache.fetched_at(), fetched_at_before);
            }
        }
    }

    /// A session is only ever active within `hold_ms` of some emitted
    /// motion signal, and every signal leaves a session active.
    #[test]
    fn session_never_outlives_hold(
        hold in 1_000u64..120_000,
        steps in vec((1u64..10_000, any::<bool>()), 1..120),
    ) {
        let mut gate = MotionGate::new(hold);
        let mut now = 0u64;
        let mut last_signal_at: Option<u64> = None;

        for (advance, present) in steps {
            now += advance;
            let signal = gate.sample(present, now);
            if signal.is_some() {
                last_signal_at = Some(now);
                prop_assert!(gate.is_session_active(now));
            }

            if gate.is_session_active(now) {
                prop_assert!(
                    last_signal_at.is_some_and(|t| now < t + hold),
                    "active at t={} with last signal {:?}, hold {}",
                    now, last_signal_at, hold
                );
            }

            gate.poll_expiry(now);
        }
    }

    /// Playback only emits colours that exist in the pattern, for any
    /// sequence of tick deltas.
    #[test]
    fn player_emits_only_pattern_colours(
        deltas in vec(0u32..10_000, 1..80),
    ) {
        for condition in ALL_CONDITIONS {
            let pattern = pattern_for(condition);
            let palette: Vec<Rgb> =
                pattern.steps().iter().map(|s| s.colour).collect();

            let mut player = PatternPlayer::new(pattern);
            for &delta in &deltas {
                let colour = player.tick(delta);
                prop_assert!(
                    palette.contains(&colour),
                    "{}: {:?} not in palette", condition, colour
                );
            }
        }
    }

    /// Brightness scaling never raises a channel, and full brightness is
    /// the identity.
    #[test]
    fn scale_is_bounded_and_identity_at_full(
        r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
        brightness in any::<u8>(),
    ) {
        let (sr, sg, sb) = scale((r, g, b), brightness);
        prop_assert!(sr <= r && sg <= g && sb <= b);
        prop_assert_eq!(scale((r, g, b), 255), (r, g, b));
    }
}
