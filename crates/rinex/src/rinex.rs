//! Parser for RINEX v2/v3 GPS navigation message files.
//!
//! Produces the raw broadcast-orbit records and the header's ionospheric/UTC
//! parameters; the `gps` crate turns these into the domain `Ephemeris` and
//! `IonoUtc` types and computes their cached Keplerian derivatives.

use std::path::Path;

use thiserror::Error;

const FIELD_WIDTH: usize = 19;

/// Errors raised while parsing a RINEX navigation file.
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened or read.
    #[error("cannot open RINEX file: {0}")]
    Io(#[from] std::io::Error),
    /// The `RINEX VERSION / TYPE` header line was missing or unparsable.
    #[error("missing or malformed RINEX version header")]
    MissingVersion,
    /// The header declared a version this parser does not support.
    #[error("unsupported RINEX version {0:.2}")]
    UnsupportedVersion(f64),
    /// The header's file-type/system letter was not GPS navigation data.
    #[error("RINEX file is not GPS navigation data (system letter '{0}')")]
    WrongSystem(char),
    /// A satellite record ended before all broadcast-orbit lines were read.
    #[error("truncated broadcast orbit block for PRN {0}")]
    TruncatedBlock(u8),
    /// `END OF HEADER` was never seen.
    #[error("RINEX header has no END OF HEADER line")]
    UnterminatedHeader,
}

/// Raw ionospheric (Klobuchar) and UTC/leap-second parameters read from the
/// header, in the units the ICD broadcasts them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawIonoUtc {
    /// Klobuchar alpha coefficients.
    pub alpha: [f64; 4],
    /// Klobuchar beta coefficients.
    pub beta: [f64; 4],
    /// UTC polynomial terms `A0, A1`.
    pub utc_a: [f64; 2],
    /// UTC reference time of week and week number.
    pub utc_tot: f64,
    /// UTC reference week number.
    pub utc_wn: i32,
    /// Current leap seconds.
    pub leap_sec: i32,
    /// `true` if both alpha and beta coefficients were present in the
    /// header (some broadcasts omit them entirely).
    pub present: bool,
}

impl Default for RawIonoUtc {
    fn default() -> Self {
        Self {
            alpha: [0.0; 4],
            beta: [0.0; 4],
            utc_a: [0.0; 2],
            utc_tot: 0.0,
            utc_wn: 0,
            leap_sec: 0,
            present: false,
        }
    }
}

/// One broadcast orbit record: a satellite's ephemeris as transmitted,
/// before any derived quantities are computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEphemeris {
    /// PRN (1..=32).
    pub prn: u8,
    /// Reference epoch (time of clock), calendar fields.
    pub toc_y: i32,
    /// Reference epoch month.
    pub toc_m: i32,
    /// Reference epoch day.
    pub toc_d: i32,
    /// Reference epoch hour.
    pub toc_hh: i32,
    /// Reference epoch minute.
    pub toc_mm: i32,
    /// Reference epoch second.
    pub toc_sec: f64,
    /// SV clock bias, s.
    pub af0: f64,
    /// SV clock drift, s/s.
    pub af1: f64,
    /// SV clock drift rate, s/s^2.
    pub af2: f64,
    /// Issue of data, ephemeris.
    pub iode: f64,
    /// Sine harmonic correction to orbit radius, m.
    pub crs: f64,
    /// Mean motion difference from computed value, rad/s.
    pub delta_n: f64,
    /// Mean anomaly at reference time, rad.
    pub m0: f64,
    /// Cosine harmonic correction to argument of latitude, rad.
    pub cuc: f64,
    /// Eccentricity.
    pub ecc: f64,
    /// Sine harmonic correction to argument of latitude, rad.
    pub cus: f64,
    /// Square root of semi-major axis, sqrt(m).
    pub sqrta: f64,
    /// Time of ephemeris, s of GPS week.
    pub toe: f64,
    /// Cosine harmonic correction to inclination, rad.
    pub cic: f64,
    /// Longitude of ascending node at weekly epoch, rad.
    pub omg0: f64,
    /// Sine harmonic correction to inclination, rad.
    pub cis: f64,
    /// Inclination at reference time, rad.
    pub inc0: f64,
    /// Cosine harmonic correction to orbit radius, m.
    pub crc: f64,
    /// Argument of perigee, rad.
    pub aop: f64,
    /// Rate of right ascension, rad/s.
    pub omgdot: f64,
    /// Rate of inclination angle, rad/s.
    pub idot: f64,
    /// GPS week number (broadcast, not modulo-1024-resolved).
    pub week: i32,
    /// SV accuracy, m.
    pub svaccr: f64,
    /// SV health.
    pub svhealth: f64,
    /// Group delay differential, s.
    pub tgd: f64,
    /// Issue of data, clock.
    pub iodc: f64,
}

struct LineCursor<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.lines.next()
    }

    fn peek(&mut self) -> Option<&&'a str> {
        self.lines.peek()
    }
}

/// Slices the trailing `n` fixed-width (19-char) Fortran `D`-exponent fields
/// off `line`, tolerating a ragged final line with fewer populated fields
/// than its nominal width.
fn trailing_fields(line: &str, n: usize) -> Vec<f64> {
    let chars: Vec<char> = line.chars().collect();
    let total = chars.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let from_end = (n - i) * FIELD_WIDTH;
        let value = if total < from_end {
            0.0
        } else {
            let start = total - from_end;
            let end = total - (n - i - 1) * FIELD_WIDTH;
            let raw: String = chars[start..end].iter().collect();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.replace(['D', 'd'], "e").parse().unwrap_or(0.0)
            }
        };
        out.push(value);
    }
    out
}

fn parse_header(
    cursor: &mut LineCursor<'_>,
) -> Result<(f64, RawIonoUtc), Error> {
    let first = cursor.next().ok_or(Error::MissingVersion)?;
    let version: f64 = first
        .get(0..9)
        .and_then(|s| s.trim().parse().ok())
        .ok_or(Error::MissingVersion)?;
    let system = first.chars().nth(20).unwrap_or('G');
    if !matches!(system, 'G' | ' ') {
        return Err(Error::WrongSystem(system));
    }
    if !(2.0..4.0).contains(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    let mut iono_utc = RawIonoUtc::default();
    let mut saw_alpha = false;
    let mut saw_beta = false;
    loop {
        let line = cursor.next().ok_or(Error::UnterminatedHeader)?;
        let label = line.get(60..).unwrap_or("").trim();
        let body = line.trim_start();
        if label == "END OF HEADER" {
            break;
        } else if label == "ION ALPHA" {
            iono_utc.alpha = parse_four(&line[2..]);
            saw_alpha = true;
        } else if label == "ION BETA" {
            iono_utc.beta = parse_four(&line[2..]);
            saw_beta = true;
        } else if label.contains("IONOSPHERIC CORR") && body.starts_with("GPSA")
        {
            iono_utc.alpha = parse_four(&line[5..]);
            saw_alpha = true;
        } else if label.contains("IONOSPHERIC CORR") && body.starts_with("GPSB")
        {
            iono_utc.beta = parse_four(&line[5..]);
            saw_beta = true;
        } else if label == "DELTA-UTC: A0,A1,T,W" {
            let vals = trailing_fields(&line[..60], 4);
            iono_utc.utc_a = [vals[0], vals[1]];
            iono_utc.utc_tot = vals[2];
            iono_utc.utc_wn = vals[3] as i32;
        } else if label.contains("TIME SYSTEM CORR") && body.starts_with("GPUT")
        {
            let vals = trailing_fields(&line[4..50], 2);
            iono_utc.utc_a = [vals[0], vals[1]];
        } else if label == "LEAP SECONDS" {
            iono_utc.leap_sec = line
                .get(0..6)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0);
        }
    }
    iono_utc.present = saw_alpha && saw_beta;
    Ok((version, iono_utc))
}

fn parse_four(rest: &str) -> [f64; 4] {
    let vals = trailing_fields(rest, 4);
    [vals[0], vals[1], vals[2], vals[3]]
}

/// Parses one satellite's broadcast orbit block (1 epoch line + 7
/// continuation lines) starting at the current cursor position.
fn parse_record(
    cursor: &mut LineCursor<'_>, v3: bool,
) -> Result<RawEphemeris, Error> {
    let epoch_line = cursor.next().ok_or(Error::TruncatedBlock(0))?;
    let (prn, y, m, d, hh, mm, sec, clock_start) = if v3 {
        let prn: u8 = epoch_line[1..3].trim().parse().unwrap_or(0);
        let y: i32 = epoch_line[4..8].trim().parse().unwrap_or(0);
        let mo: i32 = epoch_line[9..11].trim().parse().unwrap_or(0);
        let d: i32 = epoch_line[12..14].trim().parse().unwrap_or(0);
        let hh: i32 = epoch_line[15..17].trim().parse().unwrap_or(0);
        let mm: i32 = epoch_line[18..20].trim().parse().unwrap_or(0);
        let s: f64 = epoch_line[21..23].trim().parse().unwrap_or(0.0);
        (prn, y, mo, d, hh, mm, s, 23usize)
    } else {
        let prn: u8 = epoch_line[0..2].trim().parse().unwrap_or(0);
        let y: i32 = epoch_line[3..5].trim().parse().unwrap_or(0);
        let y = if y < 80 { 2000 + y } else { 1900 + y };
        let mo: i32 = epoch_line[6..8].trim().parse().unwrap_or(0);
        let d: i32 = epoch_line[9..11].trim().parse().unwrap_or(0);
        let hh: i32 = epoch_line[12..14].trim().parse().unwrap_or(0);
        let mm: i32 = epoch_line[15..17].trim().parse().unwrap_or(0);
        let s: f64 = epoch_line[17..22].trim().parse().unwrap_or(0.0);
        (prn, y, mo, d, hh, mm, s, 22usize)
    };
    let clock = trailing_fields(&epoch_line[clock_start..], 3);
    let (af0, af1, af2) = (clock[0], clock[1], clock[2]);

    let mut rows = [[0.0f64; 4]; 7];
    for row in &mut rows {
        let line = cursor.next().ok_or(Error::TruncatedBlock(prn))?;
        *row = parse_four(line);
    }

    Ok(RawEphemeris {
        prn,
        toc_y: y,
        toc_m: m,
        toc_d: d,
        toc_hh: hh,
        toc_mm: mm,
        toc_sec: sec,
        af0,
        af1,
        af2,
        iode: rows[0][0],
        crs: rows[0][1],
        delta_n: rows[0][2],
        m0: rows[0][3],
        cuc: rows[1][0],
        ecc: rows[1][1],
        cus: rows[1][2],
        sqrta: rows[1][3],
        toe: rows[2][0],
        cic: rows[2][1],
        omg0: rows[2][2],
        cis: rows[2][3],
        inc0: rows[3][0],
        crc: rows[3][1],
        aop: rows[3][2],
        omgdot: rows[3][3],
        idot: rows[4][0],
        week: rows[4][2] as i32,
        svaccr: rows[5][0],
        svhealth: rows[5][1],
        tgd: rows[5][2],
        iodc: rows[5][3],
    })
}

/// Result of parsing a full RINEX navigation file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavFile {
    /// Broadcast orbit records, in file order (possibly several sets per
    /// satellite across different reference times).
    pub records: Vec<RawEphemeris>,
    /// Ionospheric/UTC parameters from the header.
    pub iono_utc: RawIonoUtc,
}

/// Parses a RINEX v2 or v3 GPS navigation file at `path`.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, [`Error::MissingVersion`]
/// or [`Error::UnsupportedVersion`] if the header is malformed, and
/// [`Error::WrongSystem`] if the file is not GPS navigation data.
pub fn parse_file(path: &Path) -> Result<NavFile, Error> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text)
}

/// Parses RINEX nav file content already read into memory.
///
/// # Errors
/// See [`parse_file`].
pub fn parse_str(text: &str) -> Result<NavFile, Error> {
    let mut cursor = LineCursor::new(text);
    let (version, iono_utc) = parse_header(&mut cursor)?;
    let v3 = version >= 3.0;
    let mut records = Vec::new();
    while cursor.peek().is_some() {
        if cursor.peek().map(|l| l.trim().is_empty()).unwrap_or(true) {
            cursor.next();
            continue;
        }
        records.push(parse_record(&mut cursor, v3)?);
    }
    Ok(NavFile { records, iono_utc })
}

#[cfg(test)]
mod tests {
    use super::{parse_str, trailing_fields};

    const V2_SAMPLE: &str = concat!(
        "     2.11           N: GPS NAV DATA                            RINEX VERSION / TYPE\n",
        "ION ALPHA                                                          0.1397D-07 0.0000D+00-0.5960D-07 0.0000D+00\n",
        "ION BETA                                                           0.9011D+05 0.0000D+00-0.1966D+06 0.0000D+00\n",
        "DELTA-UTC: A0,A1,T,W                                               0.0000000000D+00 0.000000000D+00    61440 2032\n",
        "    18                                                              LEAP SECONDS\n",
        "                                                                    END OF HEADER\n",
        " 1 21  1  1  0  0  0.0 0.123456789012D-03 0.113686837722D-12 0.000000000000D+00\n",
        "    0.100000000000D+02 0.123125000000D+02 0.446510000000D-08 0.313524230000D+00\n",
        "    0.523403286934D-05 0.123125000000D-01 0.953674316406D-06 0.515366508484D+04\n",
        "    0.172800000000D+06-0.186264514923D-08 0.221436430000D+01-0.167638063431D-07\n",
        "    0.958931881918D+00 0.222187500000D+03 0.117312138451D+01-0.800385220926D-08\n",
        "   -0.123456789012D-09 0.100000000000D+01 0.214800000000D+04 0.000000000000D+00\n",
        "    0.200000000000D+01 0.000000000000D+00-0.838190317154D-08 0.300000000000D+01\n",
        "    0.168300000000D+06 0.400000000000D+01\n",
    );

    #[test]
    fn parses_header_iono_and_leap() {
        let nav = parse_str(V2_SAMPLE).unwrap();
        assert!(nav.iono_utc.present);
        assert_eq!(nav.iono_utc.leap_sec, 18);
        assert!((nav.iono_utc.alpha[0] - 0.1397e-07).abs() < 1e-12);
    }

    #[test]
    fn parses_one_satellite_record() {
        let nav = parse_str(V2_SAMPLE).unwrap();
        assert_eq!(nav.records.len(), 1);
        let eph = &nav.records[0];
        assert_eq!(eph.prn, 1);
        assert_eq!(eph.toc_y, 2021);
        assert!((eph.sqrta - 5153.665_084_84).abs() < 1e-3);
        assert_eq!(eph.week, 2148);
    }

    #[test]
    fn trailing_fields_tolerates_ragged_tail() {
        let line = "    0.200000000000D+01 0.000000000000D+00";
        let vals = trailing_fields(line, 4);
        assert_eq!(vals[0], 0.0);
        assert_eq!(vals[1], 0.0);
        assert!((vals[2] - 2.0).abs() < 1e-9);
        assert!((vals[3] - 0.0).abs() < 1e-9);
    }
}
