//! Output sample format: the DAC bit-depth selection consumed by the
//! modulator and negotiated with the CLI's `-b` flag.

pub use constants::{DacProfile, DataFormat};
