//! Broadcast ephemeris: the Keplerian/harmonic parameters for one satellite
//! over one ~2-hour validity window, plus the derivatives cached once at
//! parse time so the orbit propagator does not recompute them every 0.1 s.

use constants::GM_EARTH;
use geometry::GpsTime;
use rinex::RawEphemeris;

/// One satellite's broadcast ephemeris set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ephemeris {
    /// `true` once the record has been fully populated and finalized.
    pub vflg: bool,
    /// Time of clock.
    pub toc: GpsTime,
    /// Time of ephemeris.
    pub toe: GpsTime,
    /// Calendar form of [`Self::toc`], kept for the TOC/TOE overwrite path.
    pub t: geometry::DateTime,
    /// Issue of data, clock.
    pub iodc: f64,
    /// Issue of data, ephemeris.
    pub iode: f64,
    /// Mean motion difference, rad/s.
    pub delta_n: f64,
    /// Cosine harmonic, argument of latitude, rad.
    pub cuc: f64,
    /// Sine harmonic, argument of latitude, rad.
    pub cus: f64,
    /// Cosine harmonic, inclination, rad.
    pub cic: f64,
    /// Sine harmonic, inclination, rad.
    pub cis: f64,
    /// Cosine harmonic, orbit radius, m.
    pub crc: f64,
    /// Sine harmonic, orbit radius, m.
    pub crs: f64,
    /// Eccentricity.
    pub ecc: f64,
    /// Square root of semi-major axis, sqrt(m).
    pub sqrta: f64,
    /// Mean anomaly at reference time, rad.
    pub m0: f64,
    /// Longitude of ascending node at weekly epoch, rad.
    pub omg0: f64,
    /// Inclination at reference time, rad.
    pub inc0: f64,
    /// Argument of perigee, rad.
    pub aop: f64,
    /// Rate of right ascension, rad/s.
    pub omgdot: f64,
    /// Rate of inclination, rad/s.
    pub idot: f64,
    /// SV clock bias, s.
    pub af0: f64,
    /// SV clock drift, s/s.
    pub af1: f64,
    /// SV clock drift rate, s/s^2.
    pub af2: f64,
    /// Group delay differential, s.
    pub tgd: f64,
    /// SV health (0 healthy; (0,32) degraded; bit 5 set if health was 32).
    pub svhealth: i32,
    /// Broadcast GPS week number (not modulo-1024-resolved).
    pub week: i32,

    /// Cached mean motion, rad/s: `sqrt(mu / A^3) + delta_n`.
    pub n: f64,
    /// Cached `sqrt(1 - e^2)`.
    pub sqrt_one_minus_e2: f64,
    /// Cached semi-major axis, m: `sqrta^2`.
    pub a: f64,
    /// Cached `omgdot - earth_rotation_rate`.
    pub omega_dot_minus_earth_rate: f64,
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self {
            vflg: false,
            toc: GpsTime::default(),
            toe: GpsTime::default(),
            t: geometry::DateTime::default(),
            iodc: 0.0,
            iode: 0.0,
            delta_n: 0.0,
            cuc: 0.0,
            cus: 0.0,
            cic: 0.0,
            cis: 0.0,
            crc: 0.0,
            crs: 0.0,
            ecc: 0.0,
            sqrta: 0.0,
            m0: 0.0,
            omg0: 0.0,
            inc0: 0.0,
            aop: 0.0,
            omgdot: 0.0,
            idot: 0.0,
            af0: 0.0,
            af1: 0.0,
            af2: 0.0,
            tgd: 0.0,
            svhealth: 0,
            week: 0,
            n: 0.0,
            sqrt_one_minus_e2: 0.0,
            a: 0.0,
            omega_dot_minus_earth_rate: 0.0,
        }
    }
}

impl Ephemeris {
    /// Builds a finalized [`Ephemeris`] from a parsed RINEX record, per
    /// §4.2's post-decode normalization.
    #[must_use]
    pub fn from_raw(raw: &RawEphemeris) -> Self {
        let t = geometry::DateTime {
            y: raw.toc_y,
            m: raw.toc_m,
            d: raw.toc_d,
            hh: raw.toc_hh,
            mm: raw.toc_mm,
            sec: raw.toc_sec,
        };
        let toc = GpsTime::from(&t);
        let toe = GpsTime {
            week: toc.week,
            sec: raw.toe,
        };
        let svhealth = if raw.svhealth > 0.0 && raw.svhealth < 32.0 {
            raw.svhealth as i32
        } else if (raw.svhealth - 32.0).abs() < f64::EPSILON {
            1 << 5
        } else {
            raw.svhealth as i32
        };
        let mut eph = Self {
            vflg: true,
            toc,
            toe,
            t,
            iodc: raw.iodc,
            iode: raw.iode,
            delta_n: raw.delta_n,
            cuc: raw.cuc,
            cus: raw.cus,
            cic: raw.cic,
            cis: raw.cis,
            crc: raw.crc,
            crs: raw.crs,
            ecc: raw.ecc,
            sqrta: raw.sqrta,
            m0: raw.m0,
            omg0: raw.omg0,
            inc0: raw.inc0,
            aop: raw.aop,
            omgdot: raw.omgdot,
            idot: raw.idot,
            af0: raw.af0,
            af1: raw.af1,
            af2: raw.af2,
            tgd: raw.tgd,
            svhealth,
            week: raw.week,
            ..Self::default()
        };
        eph.finalize();
        eph
    }

    /// Recomputes the cached derivatives (`n`, `sqrt(1-e^2)`, `A`,
    /// `Ωdot - Ωe`) from the scalar fields. Must be called after any manual
    /// mutation of `sqrta`, `ecc`, `delta_n` or `omgdot` (there is none in
    /// this engine beyond `from_raw`, but the TOC/TOE shift in the builder
    /// does not touch these fields so no re-finalization is needed there).
    pub fn finalize(&mut self) {
        self.a = self.sqrta * self.sqrta;
        self.n = (GM_EARTH / (self.a * self.a * self.a)).sqrt() + self.delta_n;
        self.sqrt_one_minus_e2 = (1.0 - self.ecc * self.ecc).sqrt();
        self.omega_dot_minus_earth_rate =
            self.omgdot - constants::OMEGA_EARTH;
    }
}
