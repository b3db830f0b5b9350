//! USB control of a `HackRF` One software-defined radio: device discovery,
//! frequency/gain/sample-rate configuration, and bulk TX/RX streaming.

pub mod constants;
pub mod enums;
pub mod error;
pub mod hackrf;
pub mod prelude;

pub use enums::{DeviceMode, TransceiverMode};
pub use error::Error;
pub use hackrf::HackRF;
