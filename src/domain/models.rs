use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Page shown when no beacon is in range or a beacon has no page.
pub const DEFAULT_PAGE_ID: &str = "page-default";

/// Last sighting of one of our beacons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconReading {
    pub identifier: String,
    // Negative dBm, closer to zero is stronger
    pub signal_strength: i16,
    pub observed_at: Instant,
}

/// A BLE advertisement as delivered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub address: u64,
    pub rssi: i16,
    pub name: Option<String>,
}

/// Events produced by a running scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    DeviceFound(DiscoveredDevice),
    Error(String),
}

/// Events sent from the proximity service to the UI.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Alert(String),
    LogMessage(StatusMessage),
    Readings(Vec<BeaconReading>),
    PageChanged {
        beacon: Option<String>,
        page: String,
    },
}

/// Content of a single page container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDefinition {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl PageDefinition {
    pub fn new(id: &str, title: &str, body: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// Which beacon is closest and which page is on screen.
///
/// Owned by the engine and handed to the selector and router by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub current_beacon: Option<String>,
    pub current_page: String,
}

impl AppState {
    pub fn new(default_page: &str) -> Self {
        Self {
            current_beacon: None,
            current_page: default_page.to_string(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_ID)
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: MessageSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}
