use crate::domain::models::ScanEvent;
use crate::infrastructure::bluetooth::{BeaconScanner, ScanError};
use tokio::sync::mpsc;
use tracing::warn;

/// Scanner for targets without a BLE backend. Every start fails.
#[derive(Debug, Default)]
pub struct UnsupportedScanner;

impl UnsupportedScanner {
    pub fn new() -> Self {
        Self
    }
}

impl BeaconScanner for UnsupportedScanner {
    fn start(&mut self, _events: mpsc::UnboundedSender<ScanEvent>) -> Result<(), ScanError> {
        warn!("No BLE backend for this platform");
        Err(ScanError::UnsupportedPlatform)
    }

    fn stop(&mut self) -> Result<(), ScanError> {
        Ok(())
    }

    fn is_scanning(&self) -> bool {
        false
    }
}
