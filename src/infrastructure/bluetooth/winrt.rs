//! WinRT advertisement watcher
//!
//! Beacons are never connected to; their advertised local name and RSSI
//! are all we need, so a passive-ish active scan with no service filter is
//! enough.

use crate::domain::models::{DiscoveredDevice, ScanEvent};
use crate::infrastructure::bluetooth::{BeaconScanner, ScanError};
use tokio::sync::mpsc;
use tracing::{info, warn};
use windows::core::Ref;
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEAdvertisementWatcherStoppedEventArgs, BluetoothLEScanningMode,
};
use windows::Devices::Bluetooth::BluetoothError;
use windows::Foundation::TypedEventHandler;

impl From<BluetoothError> for ScanError {
    fn from(err: BluetoothError) -> Self {
        match err {
            BluetoothError::RadioNotAvailable => ScanError::RadioOff,
            BluetoothError::DisabledByPolicy | BluetoothError::DisabledByUser => {
                ScanError::Disabled
            }
            BluetoothError::NotSupported => ScanError::NotSupported,
            other => ScanError::Platform(other.0),
        }
    }
}

impl From<windows::core::Error> for ScanError {
    fn from(err: windows::core::Error) -> Self {
        warn!("WinRT call failed: {}", err);
        ScanError::System(err.code().0)
    }
}

/// BLE scanner backed by `BluetoothLEAdvertisementWatcher`
pub struct WinRtScanner {
    watcher: Option<BluetoothLEAdvertisementWatcher>,
}

impl WinRtScanner {
    pub fn new() -> Self {
        Self { watcher: None }
    }
}

impl BeaconScanner for WinRtScanner {
    fn start(&mut self, events: mpsc::UnboundedSender<ScanEvent>) -> Result<(), ScanError> {
        self.stop()?;

        info!("Starting BLE advertisement watcher");
        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        watcher.SetScanningMode(BluetoothLEScanningMode::Active)?;

        let sender = events.clone();
        let received = TypedEventHandler::new(
            move |_: Ref<BluetoothLEAdvertisementWatcher>,
                  args: Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let name = args.Advertisement()?.LocalName()?.to_string();
                    let device = DiscoveredDevice {
                        address: args.BluetoothAddress()?,
                        rssi: args.RawSignalStrengthInDBm()?,
                        name: if name.is_empty() { None } else { Some(name) },
                    };
                    let _ = sender.send(ScanEvent::DeviceFound(device));
                }
                Ok(())
            },
        );
        watcher.Received(&received)?;

        // The watcher reports radio problems by stopping with an error status
        let stopped = TypedEventHandler::new(
            move |_: Ref<BluetoothLEAdvertisementWatcher>,
                  args: Ref<BluetoothLEAdvertisementWatcherStoppedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let status = args.Error()?;
                    if status != BluetoothError::Success {
                        let err = ScanError::from(status);
                        warn!("Advertisement watcher stopped: {}", err);
                        let _ = events.send(ScanEvent::Error(err.code()));
                    }
                }
                Ok(())
            },
        );
        watcher.Stopped(&stopped)?;

        watcher.Start()?;
        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ScanError> {
        if let Some(watcher) = self.watcher.take() {
            info!("Stopping BLE advertisement watcher");
            watcher.Stop()?;
        }
        Ok(())
    }

    fn is_scanning(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for WinRtScanner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
