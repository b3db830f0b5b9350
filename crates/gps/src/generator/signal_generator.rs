//! The fully configured signal generator: owns the ephemeris table,
//! receiver trajectory, and per-channel modulation state, and drives the
//! producer/consumer handoff described in §5.

use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};

use constants::{
    EPHEM_ARRAY_SIZE, MAX_CHAN, MAX_SAT, R2D, SECONDS_IN_HOUR, SIMULATION_STEP_SECONDS,
};
use geometry::{AzEl, Ecef, GpsTime, Location};
use log::{debug, info};

use crate::{
    Error,
    channel::Channel,
    engine::Engine,
    ephemeris::Ephemeris,
    generator::utils::MotionMode,
    io::DataFormat,
    ionoutc::IonoUtc,
    modulator::{modulate, update_drive, ChannelDrive},
    navmsg::generate_nav_msg,
    orbit::compute_range,
    scheduler::{AllocTable, allocate_channels},
    sink::{FileSink, NullSink, Sink},
};

/// One allocated channel's tracked satellite geometry, as of the last
/// channel allocation or synthesis step. Used for the `-v` channel table and
/// available to any caller that wants to inspect the simulation's state.
#[derive(Debug, Clone, Copy)]
pub struct ChannelReport {
    pub prn: usize,
    pub azel: AzEl,
    pub pseudorange: f64,
}

/// A fully validated simulation ready to run, produced by
/// [`super::builder::SignalGeneratorBuilder::build`].
pub struct SignalGenerator {
    pub ephemerides: Box<[[Ephemeris; MAX_SAT]; EPHEM_ARRAY_SIZE]>,
    pub valid_ephemerides_index: usize,
    pub ionoutc: IonoUtc,
    pub positions: Vec<Ecef>,
    pub simulation_step_count: usize,
    pub receiver_gps_time: GpsTime,
    pub antenna_pattern: [f64; 37],
    pub mode: MotionMode,
    pub elevation_mask: f64,
    pub sample_frequency: f64,
    pub data_format: DataFormat,
    pub fixed_gain: Option<i32>,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,

    channels: [Channel; MAX_CHAN],
    table: AllocTable,
    step_index: usize,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self {
            ephemerides: Box::new(
                [[Ephemeris::default(); MAX_SAT]; EPHEM_ARRAY_SIZE],
            ),
            valid_ephemerides_index: 0,
            ionoutc: IonoUtc::default(),
            positions: Vec::new(),
            simulation_step_count: 0,
            receiver_gps_time: GpsTime::default(),
            antenna_pattern: [0.0; 37],
            mode: MotionMode::Static,
            elevation_mask: 0.0,
            sample_frequency: constants::DEFAULT_SAMPLE_RATE,
            data_format: DataFormat::default(),
            fixed_gain: None,
            output_file: None,
            verbose: false,
            channels: std::array::from_fn(|_| Channel::default()),
            table: AllocTable::default(),
            step_index: 0,
        }
    }
}

impl SignalGenerator {
    fn current_ephemerides(&self) -> &[Ephemeris; MAX_SAT] {
        &self.ephemerides[self.valid_ephemerides_index]
    }

    fn rx_position(&self) -> Ecef {
        match self.mode {
            MotionMode::Static => self.positions[0],
            MotionMode::Dynamic => {
                let idx = self.step_index % self.positions.len().max(1);
                self.positions[idx]
            }
        }
    }

    /// The satellites currently tracked by an allocated channel, in channel
    /// slot order.
    #[must_use]
    pub fn channel_reports(&self) -> Vec<ChannelReport> {
        self.channels
            .iter()
            .filter_map(|c| {
                c.prn.map(|prn| ChannelReport {
                    prn,
                    azel: c.azel,
                    pseudorange: c.range,
                })
            })
            .collect()
    }

    /// Logs one line per allocated channel's PRN/azimuth/elevation/
    /// pseudorange, at debug level, when `self.verbose` is set.
    fn log_channel_table(&self) {
        if !self.verbose {
            return;
        }
        for report in self.channel_reports() {
            debug!(
                "PRN {:02}  az {:6.2}  el {:5.2}  pseudorange {:.1} m",
                report.prn,
                report.azel.az * R2D,
                report.azel.el * R2D,
                report.pseudorange
            );
        }
    }

    /// Allocates the initial channel set and generates each allocated
    /// channel's first navigation-message batch.
    ///
    /// # Errors
    /// Returns [`Error::wrong_positions`] if no receiver position is set.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if self.positions.is_empty() {
            return Err(Error::wrong_positions());
        }
        let rx = self.rx_position();
        let llh = Location::from(&rx);
        let t = self.receiver_gps_time;
        let eph = *self.current_ephemerides();
        allocate_channels(
            &mut self.channels, &mut self.table, &eph, &self.ionoutc, &t, &rx,
            llh.lat, llh.lon, self.elevation_mask,
        );
        info!(
            "initialized with {} channels allocated",
            self.channels.iter().filter(|c| c.prn.is_some()).count()
        );
        self.log_channel_table();
        Ok(())
    }

    /// 30-second maintenance: regenerates every allocated channel's
    /// navigation-message batch, advances to the next ephemeris set when
    /// its anchor TOC has come within an hour of the current simulated
    /// time, and re-runs the scheduler.
    fn maintenance(&mut self) {
        let t = self.receiver_gps_time;
        let eph = *self.current_ephemerides();
        for channel in &mut self.channels {
            let Some(prn) = channel.prn else { continue };
            generate_nav_msg(&t, channel, &eph[prn - 1], &self.ionoutc, false);
        }

        if self.valid_ephemerides_index + 1 < EPHEM_ARRAY_SIZE {
            let next = &self.ephemerides[self.valid_ephemerides_index + 1];
            if let Some(next_eph) = next.iter().find(|e| e.vflg) {
                if t.diff_secs(&next_eph.toc).abs() <= SECONDS_IN_HOUR {
                    self.valid_ephemerides_index += 1;
                    debug!(
                        "advanced to ephemeris set {}",
                        self.valid_ephemerides_index
                    );
                }
            }
        }

        let rx = self.rx_position();
        let llh = Location::from(&rx);
        let eph = *self.current_ephemerides();
        allocate_channels(
            &mut self.channels, &mut self.table, &eph, &self.ionoutc, &t, &rx,
            llh.lat, llh.lon, self.elevation_mask,
        );
        self.log_channel_table();
    }

    /// Runs the producer/consumer loop until `simulation_step_count`
    /// iterations have been produced, writing each iteration's I/Q bytes
    /// to `output_file` if set, or discarding them otherwise. A
    /// convenience wrapper around [`Self::run_simulation_with_shutdown`]
    /// for callers that have no external shutdown signal.
    ///
    /// # Errors
    /// Returns [`Error::ParsingError`] wrapping a [`crate::sink::SinkError`]
    /// if the configured output file cannot be created.
    pub fn run_simulation(&mut self) -> Result<(), Error> {
        let stop = Arc::new(AtomicBool::new(false));
        match self.output_file.clone() {
            Some(path) => {
                let sink = FileSink::create(&path).map_err(|err| {
                    Error::msg(format!("ERROR: could not open output file: {err}"))
                })?;
                self.run_simulation_with_shutdown(sink, &stop)
            }
            None => self.run_simulation_with_shutdown(NullSink::default(), &stop),
        }
    }

    /// Runs the producer/consumer loop until `simulation_step_count`
    /// iterations have been produced, `stop` is set, or `sink` reports a
    /// terminal error, handing every iteration's I/Q bytes to `sink`.
    ///
    /// # Errors
    /// Propagates a fatal sink error as [`Error::ParsingError`] once the
    /// consumer thread has unwound; the synthesis loop itself has no
    /// recoverable errors during steady state.
    pub fn run_simulation_with_shutdown<S: Sink>(
        &mut self, sink: S, stop: &Arc<AtomicBool>,
    ) -> Result<(), Error> {
        let num_samples = (self.sample_frequency * SIMULATION_STEP_SECONDS).round() as usize;
        let bytes_per_iteration = num_samples * 4;
        let engine = Engine::new(bytes_per_iteration);
        let producer = engine.producer();

        let profile = self.data_format.profile();
        let fixed_gain = self.fixed_gain.map(f64::from);

        std::thread::scope(|scope| -> Result<(), Error> {
            let engine_ref = &engine;
            let consumer = scope.spawn(move || engine_ref.run_consumer(sink));

            let mut scratch = vec![0i16; num_samples * 2];
            for step in 0..self.simulation_step_count {
                if producer.stopped() || stop.load(std::sync::atomic::Ordering::SeqCst) {
                    break;
                }
                self.step_index = step;

                let rx = self.rx_position();
                let llh = Location::from(&rx);
                let eph = *self.current_ephemerides();

                let mut drives = [ChannelDrive::default(); MAX_CHAN];
                for (channel, drive) in self.channels.iter_mut().zip(drives.iter_mut()) {
                    let Some(prn) = channel.prn else { continue };
                    let range = compute_range(
                        &eph[prn - 1], &self.ionoutc, &self.receiver_gps_time, &rx,
                        llh.lat, llh.lon,
                    );
                    channel.sync_code_phase(&range.g, range.range);
                    *drive = update_drive(channel, &range, fixed_gain);
                }

                modulate(
                    &mut self.channels, &drives, self.sample_frequency,
                    num_samples, profile,
                    &mut scratch,
                );

                let bytes: &[u8] = bytemuck_cast(&scratch);
                if !producer.hand_off(bytes) {
                    break;
                }

                self.receiver_gps_time =
                    self.receiver_gps_time.add_secs(SIMULATION_STEP_SECONDS);

                if step > 0 && step % 300 == 0 {
                    self.maintenance();
                }
            }

            engine_ref.request_stop();
            let _ = consumer.join();
            Ok(())
        })
    }
}

/// Reinterprets a slice of `i16` samples as its little-endian byte
/// representation, matching §6's "interleaved 16-bit signed I, Q ... host
/// byte order" wire format without pulling in a casting crate for one
/// call site.
fn bytemuck_cast(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        bytes.extend_from_slice(&s.to_ne_bytes());
    }
    bytes
}
