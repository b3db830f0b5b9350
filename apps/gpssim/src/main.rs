//! Command-line front end for the GPS L1 C/A signal synthesizer: parses
//! flags, builds a [`SignalGenerator`], picks a sink, and runs the
//! synthesis loop to completion or until interrupted.

mod hackrf_sink;

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::Parser;
use gps::{Error, NullSink, SignalGeneratorBuilder};
use hackrf_sink::HackRfSink;
use libhackrf::HackRF;

/// Synthesizes a GPS L1 C/A baseband signal from a RINEX navigation file
/// and streams it to an SDR, a file, or nowhere (dry run).
#[derive(Debug, Parser)]
#[command(name = "gpssim", version, about)]
struct Cli {
    /// Path to a broadcast-navigation text file.
    #[arg(short = 'e', value_name = "PATH")]
    navigation_file: Option<PathBuf>,

    /// Fetch the current daily navigation file from a remote archive
    /// instead of reading `-e`. Not implemented in this build.
    #[arg(short = 'f')]
    fetch: bool,

    /// Treat the navigation file as RINEX v3. The parser detects the
    /// version from the file header regardless; this flag is accepted
    /// for interface compatibility and otherwise has no effect.
    #[arg(short = '3')]
    rinex_v3: bool,

    /// Trajectory file (CSV of t,x,y,z at 10 Hz). Enables dynamic mode.
    #[arg(short = 'u', value_name = "PATH")]
    user_motion_file: Option<PathBuf>,

    /// Trajectory as an NMEA GGA stream. Enables dynamic mode.
    #[arg(short = 'g', value_name = "PATH")]
    user_motion_nmea_gga_file: Option<PathBuf>,

    /// Static ECEF position in metres, "x,y,z".
    #[arg(short = 'c', value_name = "X,Y,Z")]
    location_ecef: Option<String>,

    /// Static geodetic position, "lat,lon,h" (degrees, degrees, metres).
    #[arg(short = 'l', value_name = "LAT,LON,H")]
    location: Option<String>,

    /// Scenario anchor time, "YYYY/MM/DD,hh:mm:ss".
    #[arg(short = 't', value_name = "TIME", conflicts_with = "time_override")]
    time: Option<String>,

    /// Anchor time (same syntax as `-t`, or `now`), and enable TOC/TOE
    /// overwrite so out-of-range ephemerides are shifted to match.
    #[arg(short = 'T', value_name = "TIME")]
    time_override: Option<String>,

    /// Simulation duration in seconds.
    #[arg(short = 'd', value_name = "SECONDS")]
    duration: Option<f64>,

    /// Sample rate in Hz (default 2,600,000; minimum 1,000,000).
    #[arg(short = 's', value_name = "HZ")]
    sample_rate: Option<usize>,

    /// I/Q sample bit depth: 8, 9, 12, or 16.
    #[arg(short = 'b', value_name = "BITS")]
    data_format: Option<usize>,

    /// Disable ionospheric delay.
    #[arg(short = 'i')]
    ionospheric_disable: bool,

    /// Verbose channel table.
    #[arg(short = 'v')]
    verbose: bool,

    /// TX attenuation in dB, clamped to [-80, 0].
    #[arg(short = 'A', value_name = "DB", allow_negative_numbers = true)]
    attenuation: Option<i32>,

    /// RF bandwidth in MHz, clamped to [1.0, 5.0].
    #[arg(short = 'B', value_name = "MHZ")]
    bandwidth: Option<f64>,

    /// SDR backend serial number ("auto" or omitted picks the first
    /// device found). Presence of this flag selects the `HackRF` sink
    /// over a dry run.
    #[arg(short = 'U', value_name = "URI")]
    backend_uri: Option<String>,

    /// SDR backend network name. Accepted for interface completeness;
    /// this build only drives USB-attached HackRF devices, so a network
    /// host name has no effect.
    #[arg(short = 'N', value_name = "HOST", default_value = "pluto.local")]
    backend_host: String,
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    if cli.fetch {
        return Err(Error::FetchNotImplemented);
    }
    if cli.rinex_v3 {
        tracing::debug!("-3 given; RINEX version is detected from the file header");
    }

    let mut builder = SignalGeneratorBuilder::default()
        .navigation_file(cli.navigation_file)?
        .time(cli.time)?
        .duration(cli.duration)
        .ionospheric_disable(Some(cli.ionospheric_disable))
        .data_format(cli.data_format)?
        .verbose(Some(cli.verbose));

    if let Some(time_override) = cli.time_override {
        builder = builder
            .time(Some(time_override))?
            .time_override(Some(true));
    }

    if let Some(rate) = cli.sample_rate {
        builder = builder.frequency(Some(rate))?;
    }

    if let Some(csv) = &cli.location_ecef {
        builder = builder.location_ecef(Some(parse_triplet(csv)?))?;
    }
    if let Some(csv) = &cli.location {
        builder = builder.location(Some(parse_triplet(csv)?))?;
    }
    if let Some(path) = cli.user_motion_file {
        builder = builder.user_motion_file(Some(path))?;
    }
    if let Some(path) = cli.user_motion_nmea_gga_file {
        builder = builder.user_motion_nmea_gga_file(Some(path))?;
    }
    if let Some(attenuation) = cli.attenuation {
        builder = builder.path_loss(Some(attenuation.clamp(-80, 0)));
    }

    let mut generator = builder.build()?;
    generator.initialize()?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        handler_stop.store(true, Ordering::SeqCst);
    })
    .map_err(|err| Error::msg(format!("ERROR: cannot install signal handler: {err}")))?;

    if let Some(serial) = cli.backend_uri {
        tracing::debug!(
            host = %cli.backend_host,
            "-N is accepted for interface completeness; only USB backends are driven"
        );
        let bandwidth_mhz = cli.bandwidth.unwrap_or(1.75).clamp(1.0, 5.0);
        let sink = open_hackrf_sink(&serial, &generator, bandwidth_mhz)?;
        generator.run_simulation_with_shutdown(sink, &stop)
    } else {
        tracing::warn!("no -U backend given; running a dry run to NullSink");
        generator.run_simulation_with_shutdown(NullSink::default(), &stop)
    }
}

/// Parses a `"a,b,c"` CLI argument into three `f64`s.
fn parse_triplet(csv: &str) -> Result<Vec<f64>, Error> {
    let values: Vec<f64> = csv
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|err| Error::msg(format!("ERROR: invalid coordinate triplet '{csv}': {err}")))?;
    if values.len() != 3 {
        return Err(Error::msg(format!(
            "ERROR: expected 3 comma-separated values in '{csv}', got {}",
            values.len()
        )));
    }
    Ok(values)
}

/// Opens and tunes a `HackRF` for transmission, matching the generator's
/// configured sample rate and frequency.
fn open_hackrf_sink(
    serial: &str, generator: &gps::SignalGenerator, bandwidth_mhz: f64,
) -> Result<HackRfSink, Error> {
    let mut device = if serial.is_empty() || serial.eq_ignore_ascii_case("auto") {
        HackRF::new_auto()
    } else {
        HackRF::new(&serial)
    }
    .map_err(|err| Error::msg(format!("ERROR: cannot open HackRF ({serial}): {err}")))?;

    device
        .set_freq(constants::CARR_FREQ as u64)
        .and_then(|()| device.set_sample_rate_auto(generator.sample_frequency))
        .and_then(|()| {
            device.set_baseband_filter_bandwidth((bandwidth_mhz * 1_000_000.0) as u32)
        })
        .and_then(|()| device.set_amp_enable(false))
        .and_then(|()| device.set_txvga_gain(30))
        .map_err(|err| Error::msg(format!("ERROR: cannot configure HackRF: {err}")))?;

    HackRfSink::open(device)
        .map_err(|err| Error::msg(format!("ERROR: cannot enter HackRF TX mode: {err}")))
}
