use crate::domain::models::AppState;
use crate::domain::registry::BeaconRegistry;
use std::cmp::Ordering;

/// Identifier of the strongest reading, or `None` if nothing is in range.
///
/// Equal signal strengths resolve to the lexicographically smallest
/// identifier so the result never depends on map iteration order.
pub fn select_closest(registry: &BeaconRegistry) -> Option<String> {
    registry
        .iter()
        .max_by(|a, b| match a.signal_strength.cmp(&b.signal_strength) {
            Ordering::Equal => b.identifier.cmp(&a.identifier),
            other => other,
        })
        .map(|reading| reading.identifier.clone())
}

/// Remembers the closest beacon between polls.
#[derive(Debug, Default)]
pub struct ClosestBeaconSelector;

impl ClosestBeaconSelector {
    pub fn new() -> Self {
        Self
    }

    /// Re-evaluate the closest beacon.
    ///
    /// Returns `Some(new_closest)` when it differs from
    /// `state.current_beacon`, after storing it there. `Some(None)` means
    /// every beacon went out of range.
    pub fn poll(&self, registry: &BeaconRegistry, state: &mut AppState) -> Option<Option<String>> {
        let closest = select_closest(registry);
        if closest == state.current_beacon {
            return None;
        }
        state.current_beacon = closest.clone();
        Some(closest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::DEFAULT_STALE_AFTER;
    use std::time::Instant;

    fn registry() -> BeaconRegistry {
        BeaconRegistry::new(["A", "B", "C"], DEFAULT_STALE_AFTER)
    }

    #[test]
    fn test_strongest_signal_wins() {
        let mut registry = registry();
        let now = Instant::now();
        registry.record("A", -60, now);
        registry.record("B", -40, now);

        assert_eq!(select_closest(&registry).as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        assert_eq!(select_closest(&registry()), None);
    }

    #[test]
    fn test_tie_break_is_smallest_identifier() {
        let mut registry = registry();
        let now = Instant::now();
        registry.record("C", -50, now);
        registry.record("B", -50, now);
        registry.record("A", -70, now);

        assert_eq!(select_closest(&registry).as_deref(), Some("B"));
    }

    #[test]
    fn test_poll_reports_changes_only() {
        let selector = ClosestBeaconSelector::new();
        let mut state = AppState::default();
        let mut registry = registry();
        let now = Instant::now();

        assert_eq!(selector.poll(&registry, &mut state), None);

        registry.record("A", -60, now);
        assert_eq!(selector.poll(&registry, &mut state), Some(Some("A".to_string())));
        assert_eq!(state.current_beacon.as_deref(), Some("A"));

        // Same closest beacon, weaker signal: no change
        registry.record("A", -65, now);
        assert_eq!(selector.poll(&registry, &mut state), None);

        registry.record("B", -30, now);
        assert_eq!(selector.poll(&registry, &mut state), Some(Some("B".to_string())));
    }

    #[test]
    fn test_poll_reports_when_all_beacons_leave() {
        let selector = ClosestBeaconSelector::new();
        let mut state = AppState::default();
        let mut registry = registry();
        let t0 = Instant::now();

        registry.record("A", -60, t0);
        selector.poll(&registry, &mut state);

        registry.prune(t0 + DEFAULT_STALE_AFTER + std::time::Duration::from_millis(1));
        assert_eq!(selector.poll(&registry, &mut state), Some(None));
        assert_eq!(state.current_beacon, None);
    }
}
