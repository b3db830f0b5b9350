//! ECEF Cartesian coordinates, geodetic (lat/lon/height) coordinates, and
//! the conversions between them.

use constants::{WGS84_A, WGS84_E};

use crate::Error;

/// Earth-Centered, Earth-Fixed Cartesian position or displacement, metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ecef {
    /// X coordinate, m.
    pub x: f64,
    /// Y coordinate, m.
    pub y: f64,
    /// Z coordinate, m.
    pub z: f64,
}

/// Geodetic position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    /// Geodetic latitude, radians.
    pub lat: f64,
    /// Geodetic longitude, radians.
    pub lon: f64,
    /// Height above the ellipsoid, m.
    pub h: f64,
}

impl From<&[f64; 3]> for Ecef {
    fn from(v: &[f64; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

impl From<&[f64; 3]> for Location {
    /// Builds a `Location` from `[lat_rad, lon_rad, h_m]`.
    fn from(v: &[f64; 3]) -> Self {
        Self {
            lat: v[0],
            lon: v[1],
            h: v[2],
        }
    }
}

impl From<&Location> for Ecef {
    fn from(loc: &Location) -> Self {
        let (x, y, z) = geodetic_to_ecef(loc.lat, loc.lon, loc.h);
        Self { x, y, z }
    }
}

impl From<&Ecef> for Location {
    fn from(ecef: &Ecef) -> Self {
        let (lat, lon, h) = ecef_to_geodetic(ecef.x, ecef.y, ecef.z);
        Self { lat, lon, h }
    }
}

impl Ecef {
    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Dot product with `other`.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

/// Converts geodetic coordinates (radians, radians, metres) to ECEF.
#[must_use]
pub fn geodetic_to_ecef(lat: f64, lon: f64, h: f64) -> (f64, f64, f64) {
    let e2 = WGS84_E * WGS84_E;
    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let x = (n + h) * lat.cos() * lon.cos();
    let y = (n + h) * lat.cos() * lon.sin();
    let z = (n * (1.0 - e2) + h) * sin_lat;
    (x, y, z)
}

/// Converts ECEF coordinates to geodetic (lat, lon radians; height metres)
/// by Bowring-style fixed-point iteration, converging on the z-correction
/// term to within 1e-3 (spec-mandated tolerance). Degenerate (near-origin)
/// inputs return `lat = lon = 0`, `h = -a` rather than iterating forever.
#[must_use]
pub fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let norm = (x * x + y * y + z * z).sqrt();
    if norm < 1e-3 {
        return (0.0, 0.0, -WGS84_A);
    }
    let e2 = WGS84_E * WGS84_E;
    let rho2 = x * x + y * y;
    let mut dz = e2 * z;
    let (mut zdz, mut n);
    loop {
        zdz = z + dz;
        let nh = (rho2 + zdz * zdz).sqrt();
        let slat = zdz / nh;
        n = WGS84_A / (1.0 - e2 * slat * slat).sqrt();
        let dz_new = n * e2 * slat;
        if (dz - dz_new).abs() < 1e-3 {
            dz = dz_new;
            break;
        }
        dz = dz_new;
    }
    zdz = z + dz;
    let nh = (rho2 + zdz * zdz).sqrt();
    let lat = zdz.atan2(rho2.sqrt());
    let lon = y.atan2(x);
    let h = nh - n;
    (lat, lon, h)
}

/// Tries [`ecef_to_geodetic`], returning [`Error::DegenerateVector`] for a
/// near-zero input instead of the sentinel `(0, 0, -a)`.
///
/// # Errors
/// Returns [`Error::DegenerateVector`] if the input vector's norm is below
/// `1e-3` m.
pub fn try_ecef_to_geodetic(
    x: f64, y: f64, z: f64,
) -> Result<(f64, f64, f64), Error> {
    if (x * x + y * y + z * z).sqrt() < 1e-3 {
        return Err(Error::DegenerateVector);
    }
    Ok(ecef_to_geodetic(x, y, z))
}

/// Projects ECEF displacement `delta` into the local East-North-Up frame
/// whose basis vectors are the rows of `basis` (as returned by
/// [`crate::local_tangent_matrix`]), in `(n, e, u)` order.
#[must_use]
pub fn ecef_to_enu(delta: &Ecef, basis: &[[f64; 3]; 3]) -> (f64, f64, f64) {
    let project = |row: &[f64; 3]| {
        row[0] * delta.x + row[1] * delta.y + row[2] * delta.z
    };
    let e = project(&basis[0]);
    let n = project(&basis[1]);
    let u = project(&basis[2]);
    (n, e, u)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{ecef_to_geodetic, geodetic_to_ecef};

    #[test_case(0.0, 0.0, 0.0; "equator prime meridian")]
    #[test_case(35.681_298_f64.to_radians(), 139.766_247_f64.to_radians(), 10.0; "tokyo")]
    #[test_case(-89.0_f64.to_radians(), 45.0_f64.to_radians(), 1000.0; "near south pole")]
    #[test_case(0.5, -2.5, -50.0; "negative height")]
    fn roundtrip_geodetic(lat: f64, lon: f64, h: f64) {
        let (x, y, z) = geodetic_to_ecef(lat, lon, h);
        let (lat2, lon2, h2) = ecef_to_geodetic(x, y, z);
        assert!((lat - lat2).abs() < 1e-8);
        assert!((lon - lon2).abs() < 1e-8);
        assert!((h - h2).abs() < 1e-2);
    }

    #[test]
    fn degenerate_vector_bails_out() {
        let (lat, lon, h) = ecef_to_geodetic(0.0, 0.0, 0.0);
        assert_eq!((lat, lon), (0.0, 0.0));
        assert!(h < 0.0);
    }
}
