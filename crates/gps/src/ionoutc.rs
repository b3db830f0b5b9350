//! Klobuchar ionospheric model coefficients plus the UTC/leap-second
//! parameters broadcast alongside them.

use rinex::RawIonoUtc;

/// Ionospheric (Klobuchar) and UTC/leap-second parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IonoUtc {
    /// Klobuchar alpha coefficients.
    pub alpha: [f64; 4],
    /// Klobuchar beta coefficients.
    pub beta: [f64; 4],
    /// UTC polynomial term A0, s.
    pub a0: f64,
    /// UTC polynomial term A1, s/s.
    pub a1: f64,
    /// UTC reference time of week, s.
    pub tot: i32,
    /// UTC reference week number.
    pub wnt: i32,
    /// Current leap seconds.
    pub dtls: i32,
    /// Future leap seconds (after the pending leap-second event).
    pub dtlsf: i32,
    /// Day number of the pending leap-second event.
    pub day_number: i32,
    /// Week number of the pending leap-second event.
    pub wnlsf: i32,
    /// `true` iff the user requested a leap-second override via `-L`.
    pub leapen: bool,
    /// Whether ionospheric correction is applied (cleared by `-i`).
    pub enable: bool,
    /// `true` iff all four header lines (alpha, beta, A0/A1, leap) were
    /// present in the source file.
    pub vflg: bool,
}

impl IonoUtc {
    /// Builds an [`IonoUtc`] from the raw header record, enabled by
    /// default (subject to later `-i` override in the builder).
    #[must_use]
    pub fn from_raw(raw: &RawIonoUtc) -> Self {
        Self {
            alpha: raw.alpha,
            beta: raw.beta,
            a0: raw.utc_a[0],
            a1: raw.utc_a[1],
            tot: raw.utc_tot as i32,
            wnt: raw.utc_wn,
            dtls: raw.leap_sec,
            dtlsf: raw.leap_sec,
            day_number: 0,
            wnlsf: 0,
            leapen: false,
            enable: true,
            vflg: raw.present,
        }
    }
}
