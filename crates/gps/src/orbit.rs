//! Keplerian orbit propagation, pseudorange/pseudorange-rate computation,
//! the Klobuchar ionospheric delay model, and visibility gating.

use constants::{OMEGA_EARTH, REL_CLOCK_F, SPEED_OF_LIGHT};
use geometry::{AzEl, Ecef, GpsTime, ecef_to_enu, enu_to_azel, local_tangent_matrix};

use crate::{ephemeris::Ephemeris, ionoutc::IonoUtc, range::Range};

/// Satellite ECEF position, velocity, and clock bias/rate at time `t`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SatState {
    /// ECEF position, m.
    pub pos: Ecef,
    /// ECEF velocity, m/s.
    pub vel: Ecef,
    /// Clock bias, s.
    pub clock_bias: f64,
    /// Clock drift rate, s/s.
    pub clock_rate: f64,
}

/// Propagates `eph` to `t`, returning ECEF position/velocity and clock
/// bias/rate, per §4.3's Keplerian model.
#[must_use]
pub fn satpos(eph: &Ephemeris, t: &GpsTime) -> SatState {
    let tk = t.wrapped_diff_secs(&eph.toe);

    let mk = eph.m0 + eph.n * tk;
    let mut ek = mk;
    for _ in 0..30 {
        let dek = (mk - ek + eph.ecc * ek.sin()) / (1.0 - eph.ecc * ek.cos());
        ek += dek;
        if dek.abs() < 1e-14 {
            break;
        }
    }
    let (sin_ek, cos_ek) = ek.sin_cos();

    let tak = (eph.sqrt_one_minus_e2 * sin_ek).atan2(cos_ek - eph.ecc);
    let mut uk = tak + eph.aop;
    let mut rk = eph.a * (1.0 - eph.ecc * cos_ek);
    let mut ik = eph.inc0 + eph.idot * tk;

    let (sin_2uk, cos_2uk) = (2.0 * uk).sin_cos();
    uk += eph.cuc * cos_2uk + eph.cus * sin_2uk;
    rk += eph.crc * cos_2uk + eph.crs * sin_2uk;
    ik += eph.cic * cos_2uk + eph.cis * sin_2uk;

    let ok = eph.omg0 + tk * eph.omega_dot_minus_earth_rate
        - OMEGA_EARTH * eph.toe.sec;

    let (sin_uk, cos_uk) = uk.sin_cos();
    let (sin_ik, cos_ik) = ik.sin_cos();
    let (sin_ok, cos_ok) = ok.sin_cos();

    let xpk = rk * cos_uk;
    let ypk = rk * sin_uk;

    let pos = Ecef {
        x: xpk * cos_ok - ypk * cos_ik * sin_ok,
        y: xpk * sin_ok + ypk * cos_ik * cos_ok,
        z: ypk * sin_ik,
    };

    // Time derivatives, standard closed-form rates.
    let ek_dot = eph.n / (1.0 - eph.ecc * cos_ek);
    let tak_dot = ek_dot * eph.sqrt_one_minus_e2 / (1.0 - eph.ecc * cos_ek);
    let uk_dot = tak_dot
        + 2.0 * tak_dot * (eph.cus * cos_2uk - eph.cuc * sin_2uk);
    let rk_dot = eph.a * eph.ecc * ek_dot * sin_ek
        + 2.0 * tak_dot * (eph.crs * cos_2uk - eph.crc * sin_2uk);
    let ik_dot = eph.idot + 2.0 * tak_dot * (eph.cis * cos_2uk - eph.cic * sin_2uk);
    let ok_dot = eph.omega_dot_minus_earth_rate;

    let xpk_dot = rk_dot * cos_uk - ypk * uk_dot;
    let ypk_dot = rk_dot * sin_uk + xpk * uk_dot;

    let vel = Ecef {
        x: xpk_dot * cos_ok
            - ypk_dot * cos_ik * sin_ok
            + ypk * sin_ik * sin_ok * ik_dot
            - pos.y * ok_dot,
        y: xpk_dot * sin_ok
            + ypk_dot * cos_ik * cos_ok
            - ypk * sin_ik * cos_ok * ik_dot
            + pos.x * ok_dot,
        z: ypk_dot * sin_ik + ypk * cos_ik * ik_dot,
    };

    let rel = REL_CLOCK_F * eph.ecc * eph.sqrta * sin_ek;
    let clock_bias = eph.af0 + tk * (eph.af1 + tk * eph.af2) + rel - eph.tgd;
    let clock_rate = eph.af1 + 2.0 * tk * eph.af2;

    SatState {
        pos,
        vel,
        clock_bias,
        clock_rate,
    }
}

/// Computes the Klobuchar ionospheric delay, m, applied along the line of
/// sight at elevation/azimuth `azel` (radians) from a receiver at geodetic
/// `(lat, lon)` (radians), for GPS time-of-day `tow_sec`.
#[must_use]
pub fn ionospheric_delay(
    iono: &IonoUtc, lat: f64, lon: f64, azel: AzEl, tow_sec: f64,
) -> f64 {
    if !iono.enable {
        return 0.0;
    }
    if !iono.vflg {
        return 5e-9 * SPEED_OF_LIGHT;
    }

    let el_semi = azel.el / std::f64::consts::PI;
    let az = azel.az;
    let lat_semi = lat / std::f64::consts::PI;
    let lon_semi = lon / std::f64::consts::PI;

    let f = 1.0 + 16.0 * (0.53 - el_semi).powi(3);

    let psi = 0.0137 / (el_semi + 0.11) - 0.022;
    let mut phi_i = lat_semi + psi * az.cos();
    phi_i = phi_i.clamp(-0.416, 0.416);
    let lam_i = lon_semi + psi * az.sin() / (phi_i * std::f64::consts::PI).cos();
    let phi_m = phi_i + 0.064 * (lam_i - 1.617).cos();

    let mut t_local = 43_200.0 * lam_i + tow_sec;
    t_local -= (t_local / 86_400.0).floor() * 86_400.0;

    let mut amp = iono.alpha[0]
        + phi_m * (iono.alpha[1] + phi_m * (iono.alpha[2] + phi_m * iono.alpha[3]));
    amp = amp.max(0.0);
    let mut per = iono.beta[0]
        + phi_m * (iono.beta[1] + phi_m * (iono.beta[2] + phi_m * iono.beta[3]));
    per = per.max(72_000.0);

    let x = 2.0 * std::f64::consts::PI * (t_local - 50_400.0) / per;
    let delay_sec = if x.abs() < 1.57 {
        f * (5e-9 + amp * (1.0 - x * x / 2.0 + x.powi(4) / 24.0))
    } else {
        f * 5e-9
    };
    delay_sec * SPEED_OF_LIGHT
}

/// Computes the full observation for `eph` at simulated time `t` from
/// receiver position `rx_xyz`, per §4.3's `computeRange`.
#[must_use]
pub fn compute_range(
    eph: &Ephemeris, iono: &IonoUtc, t: &GpsTime, rx_xyz: &Ecef, rx_lat: f64,
    rx_lon: f64,
) -> Range {
    let state = satpos(eph, t);

    let los = state.pos.sub(rx_xyz);
    let tau = los.norm() / SPEED_OF_LIGHT;

    let pos_corrected = Ecef {
        x: state.pos.x - state.vel.x * tau,
        y: state.pos.y - state.vel.y * tau,
        z: state.pos.z - state.vel.z * tau,
    };

    let xrot = pos_corrected.x + pos_corrected.y * OMEGA_EARTH * tau;
    let yrot = pos_corrected.y - pos_corrected.x * OMEGA_EARTH * tau;
    let pos_rotated = Ecef {
        x: xrot,
        y: yrot,
        z: pos_corrected.z,
    };

    let delta = pos_rotated.sub(rx_xyz);
    let d = delta.norm();
    let unit_los = Ecef {
        x: delta.x / d,
        y: delta.y / d,
        z: delta.z / d,
    };

    let basis = local_tangent_matrix(rx_lat, rx_lon);
    let (n, e, u) = ecef_to_enu(&delta, &basis);
    let azel = enu_to_azel(n, e, u);

    let iono_delay = ionospheric_delay(iono, rx_lat, rx_lon, azel, t.sec);

    let pseudorange = d - SPEED_OF_LIGHT * state.clock_bias + iono_delay;
    let rate = state.vel.dot(&unit_los);

    Range {
        g: *t,
        range: pseudorange,
        rate,
        d,
        azel,
        iono_delay,
    }
}

/// A satellite is visible iff its ephemeris is valid and its computed
/// elevation exceeds `mask` (radians).
#[must_use]
pub fn check_sat_visibility(eph: &Ephemeris, azel: AzEl, mask: f64) -> bool {
    eph.vflg && azel.el > mask
}

#[cfg(test)]
mod tests {
    use constants::{D2R, GM_EARTH};
    use geometry::{Ecef, GpsTime, Location};

    use super::{check_sat_visibility, compute_range, satpos};
    use crate::{ephemeris::Ephemeris, ionoutc::IonoUtc};

    fn circular_equatorial_ephemeris() -> Ephemeris {
        let a = 26_560_000.0_f64;
        let mut eph = Ephemeris {
            vflg: true,
            sqrta: a.sqrt(),
            ecc: 0.0,
            m0: 0.0,
            omg0: 0.0,
            inc0: 0.0,
            aop: 0.0,
            omgdot: 0.0,
            idot: 0.0,
            toe: GpsTime {
                week: 2200,
                sec: 0.0,
            },
            toc: GpsTime {
                week: 2200,
                sec: 0.0,
            },
            week: 2200,
            ..Ephemeris::default()
        };
        eph.finalize();
        eph
    }

    #[test]
    fn satpos_matches_kepler_mean_motion_at_epoch() {
        let eph = circular_equatorial_ephemeris();
        let t = eph.toe;
        let state = satpos(&eph, &t);
        let r = state.pos.norm();
        assert!((r - eph.a).abs() < 1.0);
        let expected_period =
            2.0 * std::f64::consts::PI * (eph.a.powi(3) / GM_EARTH).sqrt();
        let expected_speed = 2.0 * std::f64::consts::PI * eph.a / expected_period;
        assert!((state.vel.norm() - expected_speed).abs() < 1.0);
    }

    #[test]
    fn sub_satellite_point_is_overhead() {
        let eph = circular_equatorial_ephemeris();
        let t = eph.toe;
        let state = satpos(&eph, &t);
        let llh = Location::from(&state.pos);
        let rx = Ecef::from(&Location {
            lat: llh.lat,
            lon: llh.lon,
            h: 0.0,
        });
        let iono = IonoUtc {
            enable: false,
            ..IonoUtc::default()
        };
        let range = compute_range(&eph, &iono, &t, &rx, llh.lat, llh.lon);
        assert!(range.azel.el > std::f64::consts::FRAC_PI_2 - 1e-3);
        assert!(check_sat_visibility(&eph, range.azel, 0.0));
    }

    #[test]
    fn antipode_is_not_visible() {
        let eph = circular_equatorial_ephemeris();
        let t = eph.toe;
        let state = satpos(&eph, &t);
        let llh = Location::from(&state.pos);
        let rx = Ecef::from(&Location {
            lat: -llh.lat,
            lon: llh.lon + 180.0 * D2R,
            h: 0.0,
        });
        let iono = IonoUtc {
            enable: false,
            ..IonoUtc::default()
        };
        let range = compute_range(&eph, &iono, &t, &rx, -llh.lat, llh.lon + 180.0 * D2R);
        assert!(!check_sat_visibility(&eph, range.azel, 0.0));
    }
}
