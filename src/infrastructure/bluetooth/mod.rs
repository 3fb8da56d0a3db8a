//! Bluetooth Module
//!
//! Turns platform BLE advertisements into a stream of [`ScanEvent`]s.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ScanEvent    ┌──────────────────┐
//! │  PlatformScanner │ ─────────────▶ │ ProximityService │
//! │  (WinRT watcher) │   (mpsc)       │                  │
//! └──────────────────┘                └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scanner`] - The scanner trait shared by every platform
//! - [`error`] - Scan failures and the codes shown to the user
//! - `winrt` - Windows advertisement watcher
//! - `unsupported` - Fallback for targets without a BLE backend
//!
//! [`ScanEvent`]: crate::domain::models::ScanEvent

pub mod error;
pub mod scanner;

#[cfg(windows)]
mod winrt;
#[cfg(windows)]
pub use winrt::WinRtScanner as PlatformScanner;

#[cfg(not(windows))]
mod unsupported;
#[cfg(not(windows))]
pub use unsupported::UnsupportedScanner as PlatformScanner;

pub use error::ScanError;
pub use scanner::BeaconScanner;
