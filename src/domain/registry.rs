//! Beacon Registry
//!
//! Last known signal strength per beacon. Filled from scan events and
//! swept periodically so beacons that went out of range disappear.

use crate::domain::models::BeaconReading;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Readings older than this are dropped by [`BeaconRegistry::prune`].
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(10_000);

pub struct BeaconRegistry {
    known_beacons: HashSet<String>,
    readings: HashMap<String, BeaconReading>,
    stale_after: Duration,
}

impl BeaconRegistry {
    /// Create a registry that only accepts the given beacon identifiers
    pub fn new<I, S>(known_beacons: I, stale_after: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_beacons: known_beacons.into_iter().map(Into::into).collect(),
            readings: HashMap::new(),
            stale_after,
        }
    }

    /// Store a sighting, replacing any previous reading for the beacon.
    ///
    /// Unknown identifiers and non-negative signal strengths are ignored.
    /// Returns `true` if the reading was stored.
    pub fn record(&mut self, identifier: &str, signal_strength: i16, now: Instant) -> bool {
        if signal_strength >= 0 || !self.known_beacons.contains(identifier) {
            trace!(identifier, signal_strength, "Ignoring reading");
            return false;
        }

        self.readings.insert(
            identifier.to_string(),
            BeaconReading {
                identifier: identifier.to_string(),
                signal_strength,
                observed_at: now,
            },
        );
        true
    }

    /// Drop readings observed more than `stale_after` before `now`
    pub fn prune(&mut self, now: Instant) -> usize {
        let stale_after = self.stale_after;
        let before = self.readings.len();
        self.readings
            .retain(|_, reading| now.saturating_duration_since(reading.observed_at) <= stale_after);

        let removed = before - self.readings.len();
        if removed > 0 {
            debug!("Pruned {} stale beacon reading(s)", removed);
        }
        removed
    }

    #[cfg(test)]
    pub fn get(&self, identifier: &str) -> Option<&BeaconReading> {
        self.readings.get(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeaconReading> {
        self.readings.values()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Snapshot of all readings, strongest first
    pub fn readings(&self) -> Vec<BeaconReading> {
        let mut readings: Vec<_> = self.readings.values().cloned().collect();
        readings.sort_by(|a, b| {
            b.signal_strength
                .cmp(&a.signal_strength)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BeaconRegistry {
        BeaconRegistry::new(["canteen1", "library1", "classroom1"], DEFAULT_STALE_AFTER)
    }

    #[test]
    fn test_record_overwrites_previous_reading() {
        let mut registry = registry();
        let t0 = Instant::now();

        assert!(registry.record("canteen1", -70, t0));
        assert!(registry.record("canteen1", -55, t0 + Duration::from_millis(200)));

        assert_eq!(registry.len(), 1);
        let reading = registry.get("canteen1").unwrap();
        assert_eq!(reading.signal_strength, -55);
        assert_eq!(reading.observed_at, t0 + Duration::from_millis(200));
    }

    #[test]
    fn test_record_ignores_unknown_and_invalid() {
        let mut registry = registry();
        let now = Instant::now();

        assert!(!registry.record("kitchen9", -40, now));
        assert!(!registry.record("library1", 0, now));
        assert!(!registry.record("library1", 12, now));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prune_removes_only_stale_readings() {
        let mut registry = registry();
        let t0 = Instant::now();

        registry.record("canteen1", -60, t0);
        registry.record("library1", -50, t0 + Duration::from_secs(5));
        registry.record("classroom1", -80, t0 + Duration::from_secs(10));

        let now = t0 + Duration::from_millis(10_001);
        assert_eq!(registry.prune(now), 1);

        assert!(registry.get("canteen1").is_none());
        assert!(registry.get("library1").is_some());
        assert!(registry.get("classroom1").is_some());
    }

    #[test]
    fn test_prune_keeps_reading_exactly_at_threshold() {
        let mut registry = registry();
        let t0 = Instant::now();

        registry.record("canteen1", -60, t0);
        assert_eq!(registry.prune(t0 + DEFAULT_STALE_AFTER), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_readings_snapshot_is_strongest_first() {
        let mut registry = registry();
        let now = Instant::now();

        registry.record("canteen1", -60, now);
        registry.record("library1", -40, now);
        registry.record("classroom1", -75, now);

        let order: Vec<_> = registry
            .readings()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        assert_eq!(order, vec!["library1", "canteen1", "classroom1"]);
    }
}
