//! Local tangent (East-North-Up) frame and azimuth/elevation derivation.

use std::f64::consts::{PI, TAU};

/// Azimuth/elevation pair, radians. Azimuth in `[0, 2*PI)`, elevation in
/// `[-PI/2, PI/2]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AzEl {
    /// Azimuth, radians, measured clockwise from north.
    pub az: f64,
    /// Elevation, radians, above the local horizon.
    pub el: f64,
}

/// Builds the 3x3 East-North-Up basis at geodetic `(lat, lon)`, rows in
/// `[east, north, up]` order, each a unit vector expressed in ECEF.
#[must_use]
pub fn local_tangent_matrix(lat: f64, lon: f64) -> [[f64; 3]; 3] {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let east = [-sin_lon, cos_lon, 0.0];
    let north = [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat];
    let up = [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat];
    [east, north, up]
}

/// Derives azimuth/elevation from East-North-Up components.
#[must_use]
pub fn enu_to_azel(n: f64, e: f64, u: f64) -> AzEl {
    let mut az = e.atan2(n);
    if az < 0.0 {
        az += TAU;
    }
    let el = u.atan2((n * n + e * e).sqrt());
    AzEl { az, el }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{enu_to_azel, local_tangent_matrix};

    #[test]
    fn straight_up_is_ninety_degrees_elevation() {
        let azel = enu_to_azel(0.0, 0.0, 1.0);
        assert!((azel.el - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn azimuth_wraps_positive() {
        let azel = enu_to_azel(0.0, -1.0, 0.0);
        assert!(azel.az > 0.0 && azel.az < 2.0 * PI);
    }

    #[test]
    fn tangent_matrix_rows_are_unit_vectors() {
        let basis = local_tangent_matrix(0.5, -1.2);
        for row in basis {
            let norm = (row[0] * row[0] + row[1] * row[1] + row[2] * row[2])
                .sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }
}
