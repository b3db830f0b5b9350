//! End-to-end scenarios driving a [`SignalGenerator`] through a synthetic
//! RINEX v2 fixture and checking the results against hand-derived orbital
//! geometry, rather than against a recorded reference file.

use std::path::PathBuf;

use gps::{SignalGeneratorBuilder, orbit::compute_range};

const TOKYO_LAT_DEG: f64 = 35.681_298;
const TOKYO_LON_DEG: f64 = 139.766_247;

/// One synthetic satellite: a circular, equatorial orbit whose ascending
/// node places its sub-satellite point at `omg0_deg` longitude at the
/// fixture's anchor epoch (2014-12-21 00:00:00, a GPS week-start Sunday,
/// so the orbital correction terms that would otherwise rotate the
/// ascending node all vanish).
struct SatFixture {
    prn: u8,
    omg0_deg: f64,
}

/// Formats `v` into a 19-character Fortran-width exponential field, the
/// layout every RINEX v2 navigation value uses.
fn field19(v: f64) -> String {
    format!("{v:>19.12e}")
}

#[allow(clippy::too_many_arguments)]
fn epoch_line(
    prn: u8, y2: i32, mo: i32, d: i32, hh: i32, mm: i32, sec: f64, af0: f64,
    af1: f64, af2: f64,
) -> String {
    format!(
        "{prn:2}{y2:3}{mo:3}{d:3}{hh:3}{mm:3}{sec:5.1}{}{}{}",
        field19(af0),
        field19(af1),
        field19(af2)
    )
}

fn continuation(a: f64, b: f64, c: f64, d: f64) -> String {
    format!("    {}{}{}{}", field19(a), field19(b), field19(c), field19(d))
}

const HEADER: &str = concat!(
    "     2.11           N: GPS NAV DATA                            RINEX VERSION / TYPE\n",
    "ION ALPHA                                                          0.1397D-07 0.0000D+00-0.5960D-07 0.0000D+00\n",
    "ION BETA                                                           0.9011D+05 0.0000D+00-0.1966D+06 0.0000D+00\n",
    "DELTA-UTC: A0,A1,T,W                                               0.0000000000D+00 0.000000000D+00    61440 2032\n",
    "    18                                                              LEAP SECONDS\n",
    "                                                                    END OF HEADER\n",
);

fn satellite_block(sat: &SatFixture) -> String {
    let omg0 = sat.omg0_deg.to_radians();
    let sqrta = 26_560_000.0_f64.sqrt();
    let mut block = String::new();
    block.push_str(&epoch_line(sat.prn, 14, 12, 21, 0, 0, 0.0, 0.0, 0.0, 0.0));
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 0.0, 0.0)); // iode, crs, delta_n, m0
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 0.0, sqrta)); // cuc, ecc, cus, sqrta
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, omg0, 0.0)); // toe, cic, omg0, cis
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 0.0, 0.0)); // inc0, crc, aop, omgdot
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 1824.0, 0.0)); // idot, codes, week, spare
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 0.0, 0.0)); // svaccr, svhealth, tgd, iodc
    block.push('\n');
    block.push_str(&continuation(0.0, 0.0, 0.0, 0.0)); // transmission time, fit interval
    block.push('\n');
    block
}

fn synthetic_nav_file(sats: &[SatFixture]) -> String {
    let mut out = HEADER.to_string();
    for sat in sats {
        out.push_str(&satellite_block(sat));
    }
    out
}

fn write_temp_nav(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("gpssim-scenario-{name}-{}.n", std::process::id()));
    std::fs::write(&path, contents).expect("write synthetic nav fixture");
    path
}

/// Scenario 1: six satellites spread around Tokyo's longitude, all above
/// the horizon. Offsets and expected elevations/ranges were derived from
/// the spherical law of cosines for a circular 26,560 km orbit.
#[test]
fn scenario1_static_tokyo_six_satellites_visible() {
    let sats = [
        SatFixture { prn: 1, omg0_deg: TOKYO_LON_DEG + 12.0 },
        SatFixture { prn: 2, omg0_deg: TOKYO_LON_DEG - 12.0 },
        SatFixture { prn: 3, omg0_deg: TOKYO_LON_DEG + 36.0 },
        SatFixture { prn: 4, omg0_deg: TOKYO_LON_DEG - 36.0 },
        SatFixture { prn: 5, omg0_deg: TOKYO_LON_DEG + 60.0 },
        SatFixture { prn: 6, omg0_deg: TOKYO_LON_DEG - 60.0 },
    ];
    let nav_path = write_temp_nav("static-tokyo", &synthetic_nav_file(&sats));

    let mut generator = SignalGeneratorBuilder::default()
        .navigation_file(Some(nav_path.clone()))
        .unwrap()
        .data_format(Some(16))
        .unwrap()
        .build()
        .unwrap();
    generator.initialize().unwrap();

    let reports = generator.channel_reports();
    assert!(reports.len() >= 6, "expected all six satellites allocated a channel");
    for report in &reports {
        assert!(report.azel.el > 0.0, "PRN {} should be above the horizon", report.prn);
        assert!(
            (20_000_000.0..26_000_000.0).contains(&report.pseudorange),
            "PRN {} pseudorange {} out of expected MEO range",
            report.prn,
            report.pseudorange
        );
    }

    let _ = std::fs::remove_file(&nav_path);
}

/// Scenario 2: a receiver at Tokyo's antipode sees no satellites, since
/// the fixture's single satellite sits on the equator at Tokyo's own
/// longitude, diametrically opposite the receiver.
#[test]
fn scenario2_antipode_has_no_visible_satellites() {
    let sats = [SatFixture { prn: 1, omg0_deg: TOKYO_LON_DEG }];
    let nav_path = write_temp_nav("antipode", &synthetic_nav_file(&sats));

    let mut generator = SignalGeneratorBuilder::default()
        .navigation_file(Some(nav_path.clone()))
        .unwrap()
        .location(Some(vec![-TOKYO_LAT_DEG, TOKYO_LON_DEG - 180.0, 10.0]))
        .unwrap()
        .data_format(Some(16))
        .unwrap()
        .build()
        .unwrap();
    generator.initialize().unwrap();

    assert!(generator.channel_reports().is_empty());

    let _ = std::fs::remove_file(&nav_path);
}

/// Scenario 3: disabling the ionosphere zeroes every allocated satellite's
/// delay term, recomputed directly through `compute_range` using the
/// generator's own (public) ephemeris/receiver-time state.
#[test]
fn scenario3_ionosphere_disabled_zeroes_delay() {
    let sats = [SatFixture { prn: 1, omg0_deg: TOKYO_LON_DEG }];
    let nav_path = write_temp_nav("no-iono", &synthetic_nav_file(&sats));

    let mut generator = SignalGeneratorBuilder::default()
        .navigation_file(Some(nav_path.clone()))
        .unwrap()
        .ionospheric_disable(Some(true))
        .data_format(Some(16))
        .unwrap()
        .build()
        .unwrap();
    generator.initialize().unwrap();

    assert!(!generator.ionoutc.enable);

    let rx = generator.positions[0];
    let llh = geometry::Location::from(&rx);
    let eph = generator.ephemerides[generator.valid_ephemerides_index][0];
    assert!(eph.vflg);
    let range = compute_range(
        &eph, &generator.ionoutc, &generator.receiver_gps_time, &rx, llh.lat,
        llh.lon,
    );
    assert_eq!(range.iono_delay, 0.0);

    let _ = std::fs::remove_file(&nav_path);
}

/// Scenario 4: overwriting the ephemeris time to "now" shifts every TOC/TOE
/// forward from the fixture's 2014 anchor by the years elapsed since, far
/// more than the one-hour ephemeris validity window.
#[test]
fn scenario4_overwrite_to_now_shifts_toc_forward() {
    let sats = [SatFixture { prn: 1, omg0_deg: TOKYO_LON_DEG }];
    let contents = synthetic_nav_file(&sats);

    let baseline_path = write_temp_nav("overwrite-baseline", &contents);
    let baseline = SignalGeneratorBuilder::default()
        .navigation_file(Some(baseline_path.clone()))
        .unwrap()
        .data_format(Some(16))
        .unwrap()
        .build()
        .unwrap();
    let baseline_toc = baseline.ephemerides[baseline.valid_ephemerides_index][0].toc;

    let overwritten_path = write_temp_nav("overwrite-now", &contents);
    let overwritten = SignalGeneratorBuilder::default()
        .navigation_file(Some(overwritten_path.clone()))
        .unwrap()
        .time_override(Some(true))
        .time(Some("now".to_string()))
        .unwrap()
        .data_format(Some(16))
        .unwrap()
        .build()
        .unwrap();
    let overwritten_toc =
        overwritten.ephemerides[overwritten.valid_ephemerides_index][0].toc;

    let shift = overwritten_toc.diff_secs(&baseline_toc);
    assert!(
        shift.abs() > 1_000_000.0,
        "expected the 2014 anchor to shift by more than 1,000,000 s toward now, got {shift}"
    );

    let _ = std::fs::remove_file(&baseline_path);
    let _ = std::fs::remove_file(&overwritten_path);
}

/// Scenario 5: a receiver moving on a small circle changes a satellite's
/// geometric range sinusoidally. First-order projection of the receiver's
/// displacement onto the line of sight gives a closed-form prediction,
/// `d(t) ~= d0 + cos(el0) * radius * [cos(wt + az0) - cos(az0)]`, checked
/// here against the exact Keplerian range at each sample. The satellite
/// itself is held at its epoch (`t0`) throughout so that the only thing
/// moving is the receiver; advancing satellite time alongside receiver
/// time would swamp the 50 m-scale receiver motion with several
/// kilometres of orbital motion per sample.
#[test]
fn scenario5_dynamic_circle_doppler_matches_analytic_projection() {
    use gps::ephemeris::Ephemeris;
    use gps::ionoutc::IonoUtc;
    use geometry::{Ecef, GpsTime, Location};

    let a = 26_560_000.0_f64;
    let mut eph = Ephemeris {
        vflg: true,
        sqrta: a.sqrt(),
        ecc: 0.0,
        m0: 0.0,
        omg0: (TOKYO_LON_DEG + 20.0).to_radians(),
        inc0: 0.0,
        aop: 0.0,
        omgdot: 0.0,
        idot: 0.0,
        toe: GpsTime { week: 1824, sec: 0.0 },
        toc: GpsTime { week: 1824, sec: 0.0 },
        week: 1824,
        ..Ephemeris::default()
    };
    eph.finalize();

    let iono = IonoUtc { enable: false, ..IonoUtc::default() };
    let llh = [TOKYO_LAT_DEG.to_radians(), TOKYO_LON_DEG.to_radians(), 10.0];
    let base = Ecef::from(&Location { lat: llh[0], lon: llh[1], h: llh[2] });

    let t0 = eph.toe;
    let baseline = compute_range(&eph, &iono, &t0, &base, llh[0], llh[1]);
    assert!(
        baseline.azel.el.to_degrees() > 30.0,
        "fixture satellite should sit comfortably above the horizon, got {} deg",
        baseline.azel.el.to_degrees()
    );

    let basis = geometry::local_tangent_matrix(llh[0], llh[1]);
    let east = Ecef { x: basis[0][0], y: basis[0][1], z: basis[0][2] };
    let north = Ecef { x: basis[1][0], y: basis[1][1], z: basis[1][2] };

    let radius = 50.0_f64;
    let omega = std::f64::consts::TAU / 30.0; // one lap every 30 s
    let el0 = baseline.azel.el;
    let az0 = baseline.azel.az;

    let mut max_abs_motion_d = 0.0_f64;
    for step in 0..300 {
        let t_sec = f64::from(step) * 0.1;
        let wt = omega * t_sec;
        let dx = radius * wt.sin();
        let dy = radius * (1.0 - wt.cos());
        let rx = Ecef {
            x: base.x + dx * east.x + dy * north.x,
            y: base.y + dx * east.y + dy * north.y,
            z: base.z + dx * east.z + dy * north.z,
        };

        // The satellite stays fixed at `t0`; only the receiver moves.
        let range = compute_range(&eph, &iono, &t0, &rx, llh[0], llh[1]);

        let predicted = baseline.d
            + el0.cos() * radius * ((wt + az0).cos() - az0.cos());
        assert!(
            (range.d - predicted).abs() < 0.01,
            "step {step}: exact d={}, predicted={}",
            range.d,
            predicted
        );

        max_abs_motion_d = max_abs_motion_d.max((range.d - baseline.d).abs());
    }

    assert!(
        max_abs_motion_d > 10.0,
        "50 m of receiver motion should move the range by more than 10 m, got {max_abs_motion_d}"
    );
}
