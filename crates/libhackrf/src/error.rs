//! Errors raised while discovering, configuring, or driving a `HackRF`.

use thiserror::Error;

/// Errors surfaced by [`crate::hackrf::HackRF`].
#[derive(Debug, Error)]
pub enum Error {
    /// No matching USB device was found.
    #[error("no HackRF device found")]
    InvalidDevice,
    /// The given serial number did not match any connected device.
    #[error("no HackRF device with serial number {0}")]
    InvalidSerialNumber(String),
    /// The device's firmware is older than the API call requires.
    #[error("device firmware {device:#06x} is older than the required {minimal:#06x}")]
    VersionMismatch {
        /// The device's reported firmware version.
        device: u16,
        /// The minimum firmware version the call requires.
        minimal: u16,
    },
    /// A caller-supplied parameter was out of range.
    #[error("argument out of range")]
    Argument,
    /// A control or bulk transfer completed with fewer bytes than expected.
    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        /// Bytes requested.
        expected: usize,
        /// Bytes actually transferred.
        actual: usize,
    },
    /// The underlying USB transport failed.
    #[error("USB I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A fixed-size field could not be extracted from a control-transfer
    /// response of unexpected length.
    #[error("malformed device response: {0}")]
    Malformed(#[from] std::array::TryFromSliceError),
}
