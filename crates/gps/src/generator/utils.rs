//! Navigation-file ingestion: grouping a RINEX file's broadcast orbit
//! records into hourly sets and turning them into the domain types the
//! rest of the `gps` crate consumes.

use std::path::Path;

use constants::{EPHEM_ARRAY_SIZE, MAX_SAT, SECONDS_IN_HOUR};

use crate::{ephemeris::Ephemeris, ionoutc::IonoUtc};

/// Whether the receiver position is fixed for the whole scenario or driven
/// by a trajectory file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    Static,
    Dynamic,
}

/// Reads and groups a RINEX navigation file's records into up to
/// [`EPHEM_ARRAY_SIZE`] hourly sets, returning the number of sets
/// populated, the header's iono/UTC parameters, and the `[set][prn-1]`
/// ephemeris array, per §4.2's set-boundary rule: a new set begins
/// whenever a record's TOC is more than an hour after the current set's
/// anchor TOC.
///
/// # Errors
/// Propagates [`rinex::Error`] from the underlying parse.
pub fn read_navigation_data(
    path: &Path,
) -> Result<(usize, IonoUtc, Box<[[Ephemeris; MAX_SAT]; EPHEM_ARRAY_SIZE]>), rinex::Error> {
    let nav = rinex::parse_file(path)?;
    let iono_utc = IonoUtc::from_raw(&nav.iono_utc);

    let mut sets: Box<[[Ephemeris; MAX_SAT]; EPHEM_ARRAY_SIZE]> =
        Box::new([[Ephemeris::default(); MAX_SAT]; EPHEM_ARRAY_SIZE]);
    let mut count = 0usize;
    let mut anchor_toc: Option<geometry::GpsTime> = None;

    for raw in &nav.records {
        let eph = Ephemeris::from_raw(raw);
        let prn = raw.prn as usize;
        if prn == 0 || prn > MAX_SAT {
            continue;
        }

        let new_set = match anchor_toc {
            None => true,
            Some(anchor) => eph.toc.diff_secs(&anchor).abs() > SECONDS_IN_HOUR,
        };
        if new_set {
            if count >= EPHEM_ARRAY_SIZE {
                break;
            }
            anchor_toc = Some(eph.toc);
            count += 1;
        }
        sets[count - 1][prn - 1] = eph;
    }

    Ok((count, iono_utc, sets))
}
