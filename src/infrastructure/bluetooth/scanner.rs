//! BLE Scanner Module
//!
//! The seam between the proximity service and the platform's BLE stack.

use crate::domain::models::ScanEvent;
use crate::infrastructure::bluetooth::ScanError;
use tokio::sync::mpsc;

/// A source of BLE advertisements
pub trait BeaconScanner {
    /// Start scanning, delivering sightings and failures on `events`.
    ///
    /// Failing to start at all is reported through the returned error
    /// instead of the channel.
    fn start(&mut self, events: mpsc::UnboundedSender<ScanEvent>) -> Result<(), ScanError>;

    /// Stop scanning. Does nothing if no scan is running.
    fn stop(&mut self) -> Result<(), ScanError>;

    fn is_scanning(&self) -> bool;
}
