//! TTL-gated weather cache with stale-fallback.
//!
//! PIR-triggered activations can arrive several times a minute; the
//! provider must not be called more than once per TTL window regardless of
//! activation frequency. The dominant path — fresh entry, return it — does
//! zero I/O.
//!
//! Refetch policy on staleness:
//! - fetcher succeeds → entry replaced atomically, `fetched_at_ms = now`
//! - fetcher fails, prior entry exists → return the stale reading and leave
//!   `fetched_at_ms` untouched, so the next call retries immediately
//!   instead of waiting out a full TTL
//! - fetcher fails, no prior entry → surface `NoCachedData`

use log::{debug, warn};

use crate::error::FetchError;

use super::WeatherReading;

/// The single cache slot. Replaced wholesale on successful refetch, never
/// partially updated.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    reading: WeatherReading,
    fetched_at_ms: u64,
}

/// Where a resolved reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// The fetcher was invoked and succeeded.
    Refreshed,
    /// A fresh-enough entry was returned without I/O.
    Cached,
    /// The fetcher failed; a stale prior entry was returned as degraded
    /// fallback.
    StaleFallback(FetchError),
}

/// A resolved reading plus its provenance.
#[derive(Debug, Clone, Copy)]
pub struct CacheOutcome {
    pub reading: WeatherReading,
    pub source: CacheSource,
}

/// TTL-gated single-entry weather cache.
pub struct WeatherCache {
    ttl_ms: u64,
    entry: Option<CacheEntry>,
    fetch_count: u64,
}

impl WeatherCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            entry: None,
            fetch_count: 0,
        }
    }

    /// Resolve a weather reading at `now_ms`, invoking `fetcher` only when
    /// the entry is missing or stale.
    pub fn get<F>(&mut self, now_ms: u64, fetcher: F) -> Result<CacheOutcome, FetchError>
    where
        F: FnOnce() -> Result<WeatherReading, FetchError>,
    {
        if let Some(entry) = &self.entry {
            if now_ms.saturating_sub(entry.fetched_at_ms) < self.ttl_ms {
                debug!(
                    "weather cache hit: {} (age {} ms)",
                    entry.reading.condition,
                    now_ms.saturating_sub(entry.fetched_at_ms)
                );
                return Ok(CacheOutcome {
                    reading: entry.reading,
                    source: CacheSource::Cached,
                });
            }
        }

        self.fetch_count += 1;
        match fetcher() {
            Ok(reading) => {
                self.entry = Some(CacheEntry {
                    reading,
                    fetched_at_ms: now_ms,
                });
                debug!("weather refreshed: {}", reading.condition);
                Ok(CacheOutcome {
                    reading,
                    source: CacheSource::Refreshed,
                })
            }
            Err(e) => match &self.entry {
                // fetched_at_ms deliberately left as-is: the next call
                // retries instead of treating the stale entry as renewed.
                Some(stale) => {
                    warn!(
                        "weather fetch failed ({e}), serving stale {} from t={}",
                        stale.reading.condition, stale.fetched_at_ms
                    );
                    Ok(CacheOutcome {
                        reading: stale.reading,
                        source: CacheSource::StaleFallback(e),
                    })
                }
                None => {
                    warn!("weather fetch failed ({e}) with empty cache");
                    Err(FetchError::NoCachedData)
                }
            },
        }
    }

    /// True if an entry exists and is younger than the TTL at `now_ms`.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| now_ms.saturating_sub(e.fetched_at_ms) < self.ttl_ms)
    }

    /// Timestamp of the last successful fetch, if any.
    pub fn fetched_at(&self) -> Option<u64> {
        self.entry.as_ref().map(|e| e.fetched_at_ms)
    }

    /// The cached reading, fresh or stale, if any.
    pub fn reading(&self) -> Option<WeatherReading> {
        self.entry.as_ref().map(|e| e.reading)
    }

    /// Total fetcher invocations (cache misses), for telemetry.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    /// Drop the entry, forcing a refetch on the next `get`.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherCondition;

    const TTL: u64 = 3_600_000;

    fn rain() -> WeatherReading {
        WeatherReading::from_condition(WeatherCondition::Rain)
    }

    fn snow() -> WeatherReading {
        WeatherReading::from_condition(WeatherCondition::Snow)
    }

    #[test]
    fn empty_cache_fetches() {
        let mut cache = WeatherCache::new(TTL);
        let out = cache.get(0, || Ok(rain())).unwrap();
        assert_eq!(out.source, CacheSource::Refreshed);
        assert_eq!(out.reading.condition, WeatherCondition::Rain);
        assert_eq!(cache.fetched_at(), Some(0));
    }

    #[test]
    fn fresh_entry_returned_without_fetch() {
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();

        // 1,000,000 ms later, still inside the TTL window.
        let out = cache
            .get(1_000_000, || panic!("fetcher must not be invoked"))
            .unwrap();
        assert_eq!(out.source, CacheSource::Cached);
        assert_eq!(out.reading.condition, WeatherCondition::Rain);
        assert_eq!(cache.fetched_at(), Some(0));
    }

    #[test]
    fn stale_entry_triggers_refetch() {
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();

        let out = cache.get(4_000_000, || Ok(snow())).unwrap();
        assert_eq!(out.source, CacheSource::Refreshed);
        assert_eq!(out.reading.condition, WeatherCondition::Snow);
        assert_eq!(cache.fetched_at(), Some(4_000_000));
    }

    #[test]
    fn staleness_boundary_is_inclusive() {
        // now - fetched_at == TTL must refetch.
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();
        let out = cache.get(TTL, || Ok(snow())).unwrap();
        assert_eq!(out.source, CacheSource::Refreshed);

        // One below the boundary must not.
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();
        let out = cache
            .get(TTL - 1, || panic!("fetcher must not be invoked"))
            .unwrap();
        assert_eq!(out.source, CacheSource::Cached);
    }

    #[test]
    fn failed_refetch_serves_stale_and_keeps_timestamp() {
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();

        let out = cache.get(TTL + 1, || Err(FetchError::Timeout)).unwrap();
        assert_eq!(out.source, CacheSource::StaleFallback(FetchError::Timeout));
        assert_eq!(out.reading.condition, WeatherCondition::Rain);

        // fetched_at unchanged — the very next call retries rather than
        // waiting out another TTL window.
        assert_eq!(cache.fetched_at(), Some(0));
        let out = cache.get(TTL + 2, || Ok(snow())).unwrap();
        assert_eq!(out.source, CacheSource::Refreshed);
        assert_eq!(cache.fetched_at(), Some(TTL + 2));
    }

    #[test]
    fn failed_fetch_with_empty_cache_surfaces() {
        let mut cache = WeatherCache::new(TTL);
        let err = cache.get(0, || Err(FetchError::Network)).unwrap_err();
        assert_eq!(err, FetchError::NoCachedData);
        assert!(cache.fetched_at().is_none());
    }

    #[test]
    fn fetched_at_is_monotonic_across_successes() {
        let mut cache = WeatherCache::new(1000);
        let mut last = 0;
        for now in [0u64, 1500, 3000, 10_000] {
            cache.get(now, || Ok(rain())).unwrap();
            let at = cache.fetched_at().unwrap();
            assert!(at >= last);
            last = at;
        }
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();
        cache.invalidate();
        let out = cache.get(1, || Ok(snow())).unwrap();
        assert_eq!(out.source, CacheSource::Refreshed);
    }

    #[test]
    fn fetch_count_tracks_misses_only() {
        let mut cache = WeatherCache::new(TTL);
        cache.get(0, || Ok(rain())).unwrap();
        cache.get(1, || Ok(rain())).unwrap();
        cache.get(2, || Ok(rain())).unwrap();
        assert_eq!(cache.fetch_count(), 1);
    }
}
