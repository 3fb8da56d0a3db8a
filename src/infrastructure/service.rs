//! Proximity Service
//!
//! Bootstraps and drives the proximity engine. Everything runs on one
//! current-thread runtime: scan events, prune ticks and select ticks are
//! handled one at a time by a single task.

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::engine::{scan_alert_message, ProximityEngine};
use crate::domain::models::{AppEvent, StatusMessage};
use crate::domain::registry::BeaconRegistry;
use crate::domain::router::{PageHost, PageRouter};
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::{BeaconScanner, PlatformScanner};
use crate::infrastructure::scheduler::{IntervalTicker, Ticker};
use crate::presentation::pages::SharedPages;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

pub struct ProximityService<H: PageHost, C: Clock, S: BeaconScanner> {
    engine: ProximityEngine<H, C>,
    scanner: S,
    ui_tx: mpsc::UnboundedSender<AppEvent>,
}

impl<H: PageHost, C: Clock, S: BeaconScanner> ProximityService<H, C, S> {
    pub fn new(
        engine: ProximityEngine<H, C>,
        scanner: S,
        ui_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            engine,
            scanner,
            ui_tx,
        }
    }

    /// Wait for the host to become ready, then run until the UI goes away.
    pub async fn run<P: Ticker, T: Ticker>(
        mut self,
        ready: oneshot::Receiver<()>,
        mut prune_ticker: P,
        mut select_ticker: T,
    ) {
        if ready.await.is_err() {
            info!("Host closed before becoming ready");
            return;
        }
        info!("Host ready, starting beacon monitoring");

        let (scan_tx, mut scan_rx) = mpsc::unbounded_channel();
        match self.scanner.start(scan_tx) {
            Ok(()) => self.send(AppEvent::LogMessage(StatusMessage::info(
                "Scanning for beacons...",
            ))),
            Err(e) => {
                error!("Failed to start beacon scan: {}", e);
                self.send(AppEvent::Alert(scan_alert_message(&e.code())));
            }
        }

        self.engine.show_default_page();
        self.page_changed();

        let ui = self.ui_tx.clone();
        loop {
            tokio::select! {
                biased;

                Some(event) = scan_rx.recv() => {
                    if let Some(alert) = self.engine.handle_scan_event(event) {
                        self.send(AppEvent::Alert(alert));
                    }
                }
                _ = prune_ticker.tick() => {
                    self.engine.prune();
                }
                _ = select_ticker.tick() => {
                    if self.engine.select() {
                        self.page_changed();
                    }
                    self.send(AppEvent::Readings(self.engine.readings()));
                }
                _ = ui.closed() => {
                    debug!("UI closed, stopping proximity service");
                    break;
                }
            }
        }

        if self.scanner.is_scanning() {
            if let Err(e) = self.scanner.stop() {
                error!("Failed to stop beacon scan: {}", e);
            }
        }
    }

    fn page_changed(&self) {
        let state = self.engine.state();
        self.send(AppEvent::PageChanged {
            beacon: state.current_beacon.clone(),
            page: state.current_page.clone(),
        });
    }

    fn send(&self, event: AppEvent) {
        let _ = self.ui_tx.send(event);
    }
}

/// Start the proximity service on its own thread.
///
/// Nothing happens until `ready` fires.
pub fn spawn(
    settings: &Settings,
    pages: SharedPages,
    ui_tx: mpsc::UnboundedSender<AppEvent>,
    ready: oneshot::Receiver<()>,
) -> std::io::Result<JoinHandle<()>> {
    let settings = settings.clone();

    std::thread::Builder::new()
        .name("proximity".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for proximity service: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let registry = BeaconRegistry::new(
                    settings.beacon_pages.keys().cloned(),
                    settings.stale_after(),
                );
                let page_ids = match pages.lock() {
                    Ok(p) => p.ids(),
                    Err(_) => Vec::new(),
                };
                let router = PageRouter::new(
                    pages,
                    settings.beacon_pages.clone(),
                    page_ids,
                    &settings.default_page,
                );
                let engine = ProximityEngine::new(registry, router, SystemClock);

                // Scanner lives on this thread; the WinRT watcher is not Send
                let service = ProximityService::new(engine, PlatformScanner::new(), ui_tx);
                service
                    .run(
                        ready,
                        IntervalTicker::new(settings.prune_interval()),
                        IntervalTicker::new(settings.select_interval()),
                    )
                    .await;
            });
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::testing::ManualClock;
    use crate::domain::models::{DiscoveredDevice, PageDefinition, ScanEvent, DEFAULT_PAGE_ID};
    use crate::domain::registry::DEFAULT_STALE_AFTER;
    use crate::infrastructure::bluetooth::ScanError;
    use crate::infrastructure::scheduler::testing::ManualTicker;
    use crate::presentation::pages::PageContainers;
    use std::collections::BTreeMap;
    use std::time::Duration;

    /// Replays a fixed set of events on start, or fails to start.
    struct FakeScanner {
        script: Vec<ScanEvent>,
        fail_with: Option<ScanError>,
        scanning: bool,
    }

    impl BeaconScanner for FakeScanner {
        fn start(&mut self, events: mpsc::UnboundedSender<ScanEvent>) -> Result<(), ScanError> {
            if let Some(err) = self.fail_with.take() {
                return Err(err);
            }
            for event in self.script.drain(..) {
                events.send(event).unwrap();
            }
            self.scanning = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), ScanError> {
            self.scanning = false;
            Ok(())
        }

        fn is_scanning(&self) -> bool {
            self.scanning
        }
    }

    fn sighting(name: &str, rssi: i16) -> ScanEvent {
        ScanEvent::DeviceFound(DiscoveredDevice {
            address: 0x0102_0304_0506,
            rssi,
            name: Some(name.to_string()),
        })
    }

    fn pages() -> SharedPages {
        PageContainers::new(
            vec![
                PageDefinition::new(DEFAULT_PAGE_ID, "Welcome", ""),
                PageDefinition::new("canteen", "Canteen", ""),
                PageDefinition::new("library", "Library", ""),
            ],
            DEFAULT_PAGE_ID,
        )
        .shared()
    }

    fn service(
        pages: SharedPages,
        scanner: FakeScanner,
        clock: ManualClock,
    ) -> (
        ProximityService<SharedPages, ManualClock, FakeScanner>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let map = BTreeMap::from([
            ("canteen1".to_string(), "canteen".to_string()),
            ("library1".to_string(), "library".to_string()),
        ]);
        let registry = BeaconRegistry::new(map.keys().cloned(), DEFAULT_STALE_AFTER);
        let ids = pages.lock().unwrap().ids();
        let router = PageRouter::new(pages, map, ids, DEFAULT_PAGE_ID);
        let engine = ProximityEngine::new(registry, router, clock);
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        (ProximityService::new(engine, scanner, ui_tx), ui_rx)
    }

    /// Collect UI events up to and including the first readings snapshot
    async fn events_until_readings(ui_rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = ui_rx.recv().await {
            let done = matches!(event, AppEvent::Readings(_));
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn test_closest_beacon_page_becomes_visible() {
        let pages = pages();
        let scanner = FakeScanner {
            script: vec![sighting("canteen1", -60), sighting("library1", -40)],
            fail_with: None,
            scanning: false,
        };
        let (service, mut ui_rx) = service(pages.clone(), scanner, ManualClock::new());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (_prune_tx, prune) = ManualTicker::new();
        let (select_tx, select) = ManualTicker::new();

        let driver = async move {
            ready_tx.send(()).unwrap();
            select_tx.send(()).unwrap();
            let events = events_until_readings(&mut ui_rx).await;
            drop(ui_rx);
            events
        };

        let ((), events) = tokio::join!(service.run(ready_rx, prune, select), driver);

        let last_page = events.iter().rev().find_map(|e| match e {
            AppEvent::PageChanged { beacon, page } => Some((beacon.clone(), page.clone())),
            _ => None,
        });
        assert_eq!(
            last_page,
            Some((Some("library1".to_string()), "library".to_string()))
        );

        let visible: Vec<_> = pages
            .lock()
            .unwrap()
            .visible_pages()
            .iter()
            .map(|c| c.definition.id.clone())
            .collect();
        assert_eq!(visible, vec!["library"]);
    }

    #[tokio::test]
    async fn test_scan_error_raises_exactly_one_alert() {
        let scanner = FakeScanner {
            script: vec![ScanEvent::Error("BLUETOOTH_OFF".to_string())],
            fail_with: None,
            scanning: false,
        };
        let (service, mut ui_rx) = service(pages(), scanner, ManualClock::new());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (_prune_tx, prune) = ManualTicker::new();
        let (select_tx, select) = ManualTicker::new();

        let driver = async move {
            ready_tx.send(()).unwrap();
            select_tx.send(()).unwrap();
            let events = events_until_readings(&mut ui_rx).await;
            drop(ui_rx);
            events
        };

        let ((), events) = tokio::join!(service.run(ready_rx, prune, select), driver);

        let alerts: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Alert(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(alerts, vec!["Beacon Scan Error: BLUETOOTH_OFF"]);
    }

    #[tokio::test]
    async fn test_failed_start_alerts_and_keeps_default_page() {
        let pages = pages();
        let scanner = FakeScanner {
            script: Vec::new(),
            fail_with: Some(ScanError::UnsupportedPlatform),
            scanning: false,
        };
        let (service, mut ui_rx) = service(pages.clone(), scanner, ManualClock::new());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (_prune_tx, prune) = ManualTicker::new();
        let (select_tx, select) = ManualTicker::new();

        let driver = async move {
            ready_tx.send(()).unwrap();
            select_tx.send(()).unwrap();
            let events = events_until_readings(&mut ui_rx).await;
            drop(ui_rx);
            events
        };

        let ((), events) = tokio::join!(service.run(ready_rx, prune, select), driver);

        let alert_count = events
            .iter()
            .filter(|e| matches!(e, AppEvent::Alert(text) if text.contains("UNSUPPORTED_PLATFORM")))
            .count();
        assert_eq!(alert_count, 1);
        assert_eq!(pages.lock().unwrap().visible_pages().len(), 1);
        assert_eq!(
            pages.lock().unwrap().visible_pages()[0].definition.id,
            DEFAULT_PAGE_ID
        );
    }

    #[tokio::test]
    async fn test_prune_tick_returns_to_default_page() {
        let pages = pages();
        let clock = ManualClock::new();
        let scanner = FakeScanner {
            script: vec![sighting("canteen1", -55)],
            fail_with: None,
            scanning: false,
        };
        let (service, mut ui_rx) = service(pages.clone(), scanner, clock.clone());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (prune_tx, prune) = ManualTicker::new();
        let (select_tx, select) = ManualTicker::new();

        let visible = |pages: &SharedPages| -> Vec<String> {
            pages
                .lock()
                .unwrap()
                .visible_pages()
                .iter()
                .map(|c| c.definition.id.clone())
                .collect()
        };

        let driver = async {
            ready_tx.send(()).unwrap();
            select_tx.send(()).unwrap();
            let first = events_until_readings(&mut ui_rx).await;
            let canteen_visible = visible(&pages);

            // Nothing sighted for longer than the stale threshold
            clock.advance(Duration::from_millis(10_500));
            prune_tx.send(()).unwrap();
            select_tx.send(()).unwrap();
            let second = events_until_readings(&mut ui_rx).await;
            drop(ui_rx);
            (first, canteen_visible, second)
        };

        let ((), (first, canteen_visible, second)) =
            tokio::join!(service.run(ready_rx, prune, select), driver);

        assert!(first.iter().any(|e| matches!(
            e,
            AppEvent::PageChanged { beacon: Some(b), page } if b == "canteen1" && page == "canteen"
        )));
        assert_eq!(canteen_visible, vec!["canteen"]);

        let page_changes: Vec<_> = second
            .iter()
            .filter_map(|e| match e {
                AppEvent::PageChanged { beacon, page } => Some((beacon.clone(), page.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(page_changes, vec![(None, DEFAULT_PAGE_ID.to_string())]);
        assert!(matches!(second.last(), Some(AppEvent::Readings(r)) if r.is_empty()));
        assert_eq!(visible(&pages), vec![DEFAULT_PAGE_ID]);
    }

    #[tokio::test]
    async fn test_nothing_happens_before_ready() {
        let scanner = FakeScanner {
            script: vec![sighting("canteen1", -50)],
            fail_with: None,
            scanning: false,
        };
        let (service, mut ui_rx) = service(pages(), scanner, ManualClock::new());
        let (ready_tx, ready_rx) = oneshot::channel::<()>();
        let (_prune_tx, prune) = ManualTicker::new();
        let (_select_tx, select) = ManualTicker::new();

        drop(ready_tx);
        service.run(ready_rx, prune, select).await;

        assert!(ui_rx.recv().await.is_none());
    }
}
