//! Readers for the trajectory inputs that drive dynamic (moving-receiver)
//! scenarios: a 10 Hz ECEF CSV file and an NMEA GGA sentence stream.

use std::path::Path;

use constants::{R2D, TRAJECTORY_MAX_ROWS};
use geometry::{Ecef, Location};
use thiserror::Error;

/// Errors raised while reading a trajectory file.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("cannot open trajectory file: {0}")]
    Io(#[from] std::io::Error),
    /// A CSV row could not be parsed.
    #[error("malformed trajectory row: {0}")]
    Csv(#[from] csv::Error),
    /// An NMEA GGA sentence was malformed or not a GGA sentence.
    #[error("malformed NMEA GGA sentence: {0}")]
    Nmea(String),
}

/// Reads an ECEF trajectory CSV (`time,x,y,z` per row, 10 Hz cadence),
/// returning up to [`TRAJECTORY_MAX_ROWS`] positions.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be opened, or [`Error::Csv`] if
/// a row cannot be parsed as four floats.
pub fn read_user_motion(path: &Path) -> Result<Vec<Ecef>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut positions = Vec::with_capacity(TRAJECTORY_MAX_ROWS);
    for result in reader.records() {
        if positions.len() >= TRAJECTORY_MAX_ROWS {
            break;
        }
        let record = result?;
        if record.len() < 4 {
            continue;
        }
        let x: f64 = record[1].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad x field: {}", &record[1]))
        })?;
        let y: f64 = record[2].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad y field: {}", &record[2]))
        })?;
        let z: f64 = record[3].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad z field: {}", &record[3]))
        })?;
        positions.push(Ecef::from(&[x, y, z]));
    }
    Ok(positions)
}

/// Reads an LLH trajectory CSV (`time,lat_deg,lon_deg,alt_m` per row, 10 Hz
/// cadence), converting each row to ECEF, returning up to
/// [`TRAJECTORY_MAX_ROWS`] positions.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be opened, or [`Error::Csv`]/
/// [`Error::Nmea`] if a row cannot be parsed as four floats.
pub fn read_user_motion_llh(path: &Path) -> Result<Vec<Ecef>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut positions = Vec::with_capacity(TRAJECTORY_MAX_ROWS);
    for result in reader.records() {
        if positions.len() >= TRAJECTORY_MAX_ROWS {
            break;
        }
        let record = result?;
        if record.len() < 4 {
            continue;
        }
        let lat: f64 = record[1].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad lat field: {}", &record[1]))
        })?;
        let lon: f64 = record[2].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad lon field: {}", &record[2]))
        })?;
        let h: f64 = record[3].trim().parse().map_err(|_| {
            Error::Nmea(format!("bad height field: {}", &record[3]))
        })?;
        let llh = [lat / R2D, lon / R2D, h];
        positions.push(Ecef::from(&Location::from(&llh)));
    }
    Ok(positions)
}

/// Parses one `$GxGGA` sentence into `(lat_deg, lon_deg, alt_m)`.
fn parse_gga(line: &str) -> Option<(f64, f64, f64)> {
    let line = line.trim();
    let body = line.split('*').next().unwrap_or(line);
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < 10 || !fields[0].ends_with("GGA") {
        return None;
    }
    let raw_lat: f64 = fields[2].parse().ok()?;
    let ns = fields[3].chars().next()?;
    let raw_lon: f64 = fields[4].parse().ok()?;
    let ew = fields[5].chars().next()?;
    let alt: f64 = fields[9].parse().ok()?;
    let sep: f64 = fields.get(11).and_then(|s| s.parse().ok()).unwrap_or(0.0);

    let lat_deg = raw_lat.div_euclid(100.0) + (raw_lat % 100.0) / 60.0;
    let lon_deg = raw_lon.div_euclid(100.0) + (raw_lon % 100.0) / 60.0;
    let lat_deg = if ns == 'S' { -lat_deg } else { lat_deg };
    let lon_deg = if ew == 'W' { -lon_deg } else { lon_deg };
    Some((lat_deg, lon_deg, alt + sep))
}

/// Reads a trajectory from a stream of NMEA GGA sentences, one per 0.1 s
/// epoch, returning up to [`TRAJECTORY_MAX_ROWS`] ECEF positions.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be opened.
pub fn read_nmea_gga(path: &Path) -> Result<Vec<Ecef>, Error> {
    let text = std::fs::read_to_string(path)?;
    let mut positions = Vec::with_capacity(TRAJECTORY_MAX_ROWS);
    for line in text.lines() {
        if positions.len() >= TRAJECTORY_MAX_ROWS {
            break;
        }
        let Some((lat_deg, lon_deg, h)) = parse_gga(line) else {
            continue;
        };
        let llh = [lat_deg / R2D, lon_deg / R2D, h];
        positions.push(Ecef::from(&Location::from(&llh)));
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::parse_gga;

    #[test]
    fn parses_northern_eastern_fix() {
        let line =
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let (lat, lon, alt) = parse_gga(line).unwrap();
        assert!((lat - 48.1173).abs() < 1e-3);
        assert!((lon - 11.516_67).abs() < 1e-3);
        assert!((alt - (545.4 + 46.9)).abs() < 1e-6);
    }

    #[test]
    fn parses_southern_western_fix() {
        let line = "$GPGGA,000000,3341.000,S,07030.500,W,1,08,0.9,10.0,M,0.0,M,,*00";
        let (lat, lon, _alt) = parse_gga(line).unwrap();
        assert!(lat < 0.0);
        assert!(lon < 0.0);
    }

    #[test]
    fn non_gga_lines_are_skipped() {
        assert!(parse_gga("$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39")
            .is_none());
    }
}
