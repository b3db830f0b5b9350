//! GPS L1 C/A signal synthesis: RINEX ephemeris ingestion, orbit
//! propagation, navigation-message framing, and baseband modulation for
//! software-defined-radio transmission.

pub mod channel;
pub mod engine;
pub mod ephemeris;
pub mod generator;
pub mod ionoutc;
pub mod io;
pub mod modulator;
pub mod navmsg;
pub mod orbit;
pub mod range;
pub mod scheduler;
pub mod sink;

use thiserror::Error;

pub use crate::{
    generator::{
        builder::SignalGeneratorBuilder,
        signal_generator::{ChannelReport, SignalGenerator},
    },
    sink::{FileSink, NullSink, Sink, SinkError},
};

/// Errors raised while configuring or running a [`SignalGenerator`].
#[derive(Debug, Error)]
pub enum Error {
    /// No ephemeris record survived parsing the navigation file.
    #[error("no valid ephemeris data found in navigation file")]
    NoEphemeris,
    /// A navigation or trajectory file could not be read or parsed.
    #[error("{0}")]
    ParsingError(String),
    /// A date/time string could not be parsed.
    #[error("invalid date/time: {0}")]
    DateTime(#[from] jiff::Error),
    /// Any other configuration error, with a human-readable message.
    #[error("{0}")]
    Message(String),
    /// The remote daily-navigation-file fetch was requested but has no
    /// implementation in this build.
    #[error("fetching the daily navigation file is not implemented")]
    FetchNotImplemented,
}

/// Retrieves the current day's broadcast-navigation file from a remote
/// archive, ahead of parsing it as a RINEX navigation file.
///
/// No implementation ships in this crate; the CLI layer's `-f` flag
/// constructs whatever collaborator it has and reports
/// [`Error::FetchNotImplemented`] when none is wired in.
pub trait FetchNavigationFile {
    /// Downloads today's navigation file to `destination`, returning the
    /// path it was written to.
    ///
    /// # Errors
    /// Returns [`Error::FetchNotImplemented`] unless overridden.
    fn fetch(&self, destination: &std::path::Path) -> Result<std::path::PathBuf, Error> {
        let _ = destination;
        Err(Error::FetchNotImplemented)
    }
}

impl Error {
    /// Builds a [`Error::Message`] from any string-like value.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// A `data_format` value other than 8, 9, 12, or 16 was given.
    #[must_use]
    pub fn invalid_data_format() -> Self {
        Self::msg("ERROR: Invalid data format. Must be 8, 9, 12, or 16.")
    }

    /// Two positioning methods (`-c`/`-l`/`-u`/`-x`/`-g`) were set at once.
    #[must_use]
    pub fn duplicate_position() -> Self {
        Self::msg("ERROR: Only one positioning method may be specified.")
    }

    /// `build()` was called without a navigation file.
    #[must_use]
    pub fn navigation_not_set() -> Self {
        Self::msg("ERROR: No navigation file specified.")
    }

    /// `-L`'s day-of-week component was outside 1..=7.
    #[must_use]
    pub fn invalid_gps_day() -> Self {
        Self::msg("ERROR: Invalid GPS day number. Must be between 1 and 7.")
    }

    /// `-L`'s GPS week component was negative.
    #[must_use]
    pub fn invalid_gps_week() -> Self {
        Self::msg("ERROR: Invalid GPS week number. Must be non-negative.")
    }

    /// `-L`'s leap-second delta was outside -128..=127.
    #[must_use]
    pub fn invalid_delta_leap_second() -> Self {
        Self::msg(
            "ERROR: Invalid delta leap second. Must be between -128 and 127.",
        )
    }

    /// No receiver position was resolved (positions vector is empty).
    #[must_use]
    pub fn wrong_positions() -> Self {
        Self::msg("ERROR: No valid receiver position specified.")
    }

    /// `-d`'s duration was negative.
    #[must_use]
    pub fn invalid_duration() -> Self {
        Self::msg("ERROR: Duration must be non-negative.")
    }

    /// `-t`'s start time fell outside the navigation file's ephemeris
    /// coverage.
    #[must_use]
    pub fn invalid_start_time() -> Self {
        Self::msg(
            "ERROR: Start time is outside the ephemeris file's valid range.",
        )
    }

    /// No ephemeris set covers the resolved start time.
    #[must_use]
    pub fn no_current_ephemerides() -> Self {
        Self::msg("ERROR: No ephemeris available at the simulation start time.")
    }

    /// `build()` was called without a `-b` data format.
    #[must_use]
    pub fn data_format_not_set() -> Self {
        Self::msg("ERROR: No data format specified.")
    }

    /// `-s`'s sampling frequency was below the minimum supported rate.
    #[must_use]
    pub fn invalid_sampling_frequency() -> Self {
        Self::msg(format!(
            "ERROR: Sampling frequency must be at least {} Hz.",
            constants::MIN_SAMPLE_RATE
        ))
    }
}
