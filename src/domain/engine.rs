//! Proximity Engine
//!
//! Ties the registry, selector and router together around one explicit
//! [`AppState`]. The engine never touches timers or channels itself; the
//! service decides when each reaction runs.

use crate::domain::clock::Clock;
use crate::domain::models::{AppState, BeaconReading, ScanEvent};
use crate::domain::registry::BeaconRegistry;
use crate::domain::router::{PageHost, PageRouter};
use crate::domain::selector::ClosestBeaconSelector;
use tracing::{trace, warn};

/// Text of the blocking alert raised for a scan failure
pub fn scan_alert_message(code: &str) -> String {
    format!("Beacon Scan Error: {}", code)
}

pub struct ProximityEngine<H: PageHost, C: Clock> {
    registry: BeaconRegistry,
    selector: ClosestBeaconSelector,
    router: PageRouter<H>,
    state: AppState,
    clock: C,
}

impl<H: PageHost, C: Clock> ProximityEngine<H, C> {
    pub fn new(registry: BeaconRegistry, router: PageRouter<H>, clock: C) -> Self {
        let state = AppState::new(router.default_page());
        Self {
            registry,
            selector: ClosestBeaconSelector::new(),
            router,
            state,
            clock,
        }
    }

    /// Show the default page
    pub fn show_default_page(&mut self) {
        let default_page = self.router.default_page().to_string();
        self.router.navigate(&mut self.state, &default_page);
    }

    /// React to one scan event.
    ///
    /// Returns the alert text to show the user when the event is an error.
    pub fn handle_scan_event(&mut self, event: ScanEvent) -> Option<String> {
        match event {
            ScanEvent::DeviceFound(device) => {
                if let Some(name) = device.name.as_deref() {
                    let now = self.clock.now();
                    if self.registry.record(name, device.rssi, now) {
                        trace!(
                            beacon = name,
                            address = format_args!("{:012X}", device.address),
                            rssi = device.rssi,
                            "Beacon sighted"
                        );
                    }
                }
                None
            }
            ScanEvent::Error(code) => {
                warn!("Beacon scan failed: {}", code);
                Some(scan_alert_message(&code))
            }
        }
    }

    /// Drop stale readings
    pub fn prune(&mut self) -> usize {
        let now = self.clock.now();
        self.registry.prune(now)
    }

    /// Re-evaluate the closest beacon and switch pages if it changed.
    ///
    /// Returns `true` when a page switch happened.
    pub fn select(&mut self) -> bool {
        match self.selector.poll(&self.registry, &mut self.state) {
            Some(closest) => {
                self.router
                    .navigate_to_beacon(&mut self.state, closest.as_deref());
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn readings(&self) -> Vec<BeaconReading> {
        self.registry.readings()
    }

    #[cfg(test)]
    pub fn router(&self) -> &PageRouter<H> {
        &self.router
    }
}
