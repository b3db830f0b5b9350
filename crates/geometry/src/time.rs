//! GPS week/seconds-of-week and Gregorian calendar time, and the algebra
//! that converts between them.

use constants::SECONDS_IN_WEEK;

/// A Gregorian calendar timestamp with fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DateTime {
    /// Year, e.g. 2022.
    pub y: i32,
    /// Month, 1..=12.
    pub m: i32,
    /// Day of month, 1..=31.
    pub d: i32,
    /// Hour, 0..=23.
    pub hh: i32,
    /// Minute, 0..=59.
    pub mm: i32,
    /// Seconds, possibly fractional, 0.0..60.0.
    pub sec: f64,
}

/// GPS week number and seconds-of-week, the native time representation for
/// everything downstream of ephemeris parsing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsTime {
    /// GPS week number since 1980-01-06 (no rollover folding).
    pub week: i32,
    /// Seconds into the week, normalized to `[0, 604_800)` after arithmetic.
    pub sec: f64,
}

const DAYS_BEFORE_MONTH: [i32; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

impl From<&DateTime> for GpsTime {
    /// Converts a calendar date to GPS week/seconds-of-week.
    ///
    /// Uses the 1980-01-06 epoch; the leap-day correction matches the ICD
    /// convention of counting Jan 6 1980 as day zero.
    fn from(t: &DateTime) -> Self {
        let ye = t.y - 1980;
        let mut lpdays = ye / 4 + 1;
        if ye % 4 == 0 && t.m <= 2 {
            lpdays -= 1;
        }
        let mut de = ye * 365 + DAYS_BEFORE_MONTH[(t.m - 1) as usize] + t.d
            + lpdays
            - 6;
        let mut sec = f64::from(t.hh * 3600 + t.mm * 60) + t.sec;
        let week = de / 7;
        de %= 7;
        sec += f64::from(de) * 86_400.0;
        Self { week, sec }
    }
}

impl From<&GpsTime> for DateTime {
    /// Converts GPS week/seconds-of-week to a calendar date via the Julian
    /// day number.
    fn from(g: &GpsTime) -> Self {
        let c0 = (7 * g.week) as f64 + (g.sec / 86_400.0).floor() + 2_444_245.0;
        let c0 = c0 as i64 + 32_044;
        let b = (4 * c0 + 3) / 146_097;
        let c = c0 - (b * 146_097) / 4;
        let d = (4 * c + 3) / 1461;
        let e = c - (1461 * d) / 4;
        let m = (5 * e + 2) / 153;

        let day = e - (153 * m + 2) / 5 + 1;
        let month = m + 3 - 12 * (m / 10);
        let year = b * 100 + d - 4800 + (m / 10);

        let sec_of_day = g.sec.rem_euclid(86_400.0);
        #[allow(clippy::cast_possible_truncation)]
        let hh = (sec_of_day / 3600.0) as i32 % 24;
        #[allow(clippy::cast_possible_truncation)]
        let mm = (sec_of_day / 60.0) as i32 % 60;
        let sec = sec_of_day - 60.0 * (sec_of_day / 60.0).floor();

        Self {
            y: year as i32,
            m: month as i32,
            d: day as i32,
            hh,
            mm,
            sec,
        }
    }
}

impl GpsTime {
    /// Returns a new `GpsTime` with `delta` seconds added, week-normalized.
    #[must_use]
    pub fn add_secs(&self, delta: f64) -> Self {
        let mut week = self.week;
        let mut sec = self.sec + delta;
        while sec < 0.0 {
            sec += SECONDS_IN_WEEK;
            week -= 1;
        }
        while sec >= SECONDS_IN_WEEK {
            sec -= SECONDS_IN_WEEK;
            week += 1;
        }
        Self { week, sec }
    }

    /// Returns `self - other`, in seconds, across week boundaries.
    #[must_use]
    pub fn diff_secs(&self, other: &Self) -> f64 {
        f64::from(self.week - other.week) * SECONDS_IN_WEEK
            + (self.sec - other.sec)
    }

    /// Wraps `self - reference` into `(-half_week, half_week]`, the
    /// convention `satpos`'s `tk` uses.
    #[must_use]
    pub fn wrapped_diff_secs(&self, reference: &Self) -> f64 {
        let mut dt = self.diff_secs(reference);
        while dt > constants::SECONDS_IN_HALF_WEEK {
            dt -= SECONDS_IN_WEEK;
        }
        while dt <= -constants::SECONDS_IN_HALF_WEEK {
            dt += SECONDS_IN_WEEK;
        }
        dt
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{DateTime, GpsTime};

    #[test_case(1980, 1, 6, 0, 0, 0.0; "epoch")]
    #[test_case(2014, 12, 20, 0, 0, 0.0; "scenario day")]
    #[test_case(2022, 1, 1, 11, 45, 14.0; "arbitrary")]
    #[test_case(2099, 12, 31, 23, 59, 59.0; "far future")]
    fn roundtrip_date_to_gps_to_date(
        y: i32, m: i32, d: i32, hh: i32, mm: i32, sec: f64,
    ) {
        let date = DateTime {
            y,
            m,
            d,
            hh,
            mm,
            sec,
        };
        let gps = GpsTime::from(&date);
        let back = DateTime::from(&gps);
        assert_eq!(date.y, back.y);
        assert_eq!(date.m, back.m);
        assert_eq!(date.d, back.d);
        assert_eq!(date.hh, back.hh);
        assert_eq!(date.mm, back.mm);
        assert!((date.sec - back.sec).abs() < 1e-3);
    }

    #[test]
    fn roundtrip_gps_to_date_to_gps() {
        let gps = GpsTime {
            week: 2200,
            sec: 345_678.0,
        };
        let date = DateTime::from(&gps);
        let back = GpsTime::from(&date);
        assert_eq!(gps.week, back.week);
        assert!((gps.sec - back.sec).abs() < 1e-3);
    }

    #[test]
    fn add_secs_normalizes_week_rollover() {
        let g = GpsTime {
            week: 100,
            sec: 604_799.0,
        };
        let g2 = g.add_secs(2.0);
        assert_eq!(g2.week, 101);
        assert!((g2.sec - 1.0).abs() < 1e-9);
    }
}
