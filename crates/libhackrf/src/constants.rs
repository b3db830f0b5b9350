//! USB identifiers, endpoint addresses, and the MAX2837 baseband filter's
//! discrete bandwidth steps.

/// `HackRF` USB vendor ID.
pub const HACKRF_USB_VID: u16 = 0x1d50;
/// `HackRF` One USB product ID.
pub const HACKRF_ONE_USB_PID: u16 = 0x6089;

/// Bulk IN endpoint used for receive streaming.
pub const HACKRF_RX_ENDPOINT_ADDRESS: u8 = 0x81;
/// Bulk OUT endpoint used for transmit streaming.
pub const HACKRF_TX_ENDPOINT_ADDRESS: u8 = 0x02;

/// Size of one bulk transfer buffer, bytes.
pub const HACKRF_TRANSFER_BUFFER_SIZE: usize = 262_144;
/// Size of the device's internal ring buffer, bytes.
pub const HACKRF_DEVICE_BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// One megahertz, for splitting a frequency into the device's MHz/Hz
/// wire format.
pub const MHZ: u64 = 1_000_000;

/// The MAX2837 baseband filter's available bandwidth steps, Hz, ascending.
pub const MAX2837: [u32; 16] = [
    1_750_000, 2_500_000, 3_500_000, 5_000_000, 5_500_000, 6_000_000,
    7_000_000, 8_000_000, 9_000_000, 10_000_000, 12_000_000, 14_000_000,
    15_000_000, 20_000_000, 24_000_000, 28_000_000,
];
