use thiserror::Error;

/// Reasons a beacon scan can fail
// Only the WinRT backend produces the radio and system variants
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("bluetooth radio is off or unavailable")]
    RadioOff,
    #[error("bluetooth is disabled by the user or by policy")]
    Disabled,
    #[error("bluetooth LE scanning is not supported by this adapter")]
    NotSupported,
    #[error("beacon scanning is not available on this platform")]
    UnsupportedPlatform,
    /// Platform error code without a dedicated variant
    #[error("bluetooth error {0}")]
    Platform(i32),
    /// OS-level failure, carrying the HRESULT
    #[error("bluetooth system-level error {0:#010X}")]
    System(i32),
}

impl ScanError {
    /// Code shown to the user in the scan error alert
    pub fn code(&self) -> String {
        match self {
            Self::RadioOff => "BLUETOOTH_OFF".to_string(),
            Self::Disabled => "BLUETOOTH_DISABLED".to_string(),
            Self::NotSupported => "NOT_SUPPORTED".to_string(),
            Self::UnsupportedPlatform => "UNSUPPORTED_PLATFORM".to_string(),
            Self::Platform(code) => format!("BLUETOOTH_ERROR_{}", code),
            Self::System(hresult) => format!("SYSTEM_{:#010X}", hresult),
        }
    }
}
