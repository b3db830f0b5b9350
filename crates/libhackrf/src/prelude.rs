//! Convenience re-exports for callers driving a `HackRF` device.

pub use crate::{
    enums::{DeviceMode, TransceiverMode},
    error::Error,
    hackrf::HackRF,
};
