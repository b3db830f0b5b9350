//! A single satellite-to-receiver observation recomputed every 0.1 s.

use geometry::{AzEl, GpsTime};

/// One range/visibility observation for a satellite at a given receiver
/// position and simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    /// GPS time of the observation (the satellite's transmit time).
    pub g: GpsTime,
    /// Pseudorange, m.
    pub range: f64,
    /// Pseudorange rate, m/s.
    pub rate: f64,
    /// True geometric distance (no clock/iono correction), m.
    pub d: f64,
    /// Azimuth/elevation as seen from the receiver.
    pub azel: AzEl,
    /// Ionospheric delay applied, m.
    pub iono_delay: f64,
}
