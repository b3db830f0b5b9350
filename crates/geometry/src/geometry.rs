//! Time and geodesy primitives shared across the signal-synthesis engine:
//! GPS/calendar time algebra, ECEF/geodetic conversions and the local
//! East-North-Up tangent frame used to derive azimuth/elevation.

mod azel;
mod ecef;
mod time;

pub use azel::{AzEl, enu_to_azel, local_tangent_matrix};

pub use ecef::{
    Ecef, Location, ecef_to_enu, ecef_to_geodetic, geodetic_to_ecef,
    try_ecef_to_geodetic,
};
pub use time::{DateTime, GpsTime};

use thiserror::Error;

/// Errors raised by the geometry primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector passed to a coordinate conversion had a degenerate (near
    /// zero) norm.
    #[error("degenerate vector: norm below 1e-3 m")]
    DegenerateVector,
}
