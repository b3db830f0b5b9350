//! The consumer side of the producer/consumer handoff: anything that can
//! accept a finished I/Q buffer.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

/// Errors raised while delivering a finished I/Q buffer to its destination.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink's underlying I/O (file, USB transfer, ...) failed.
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumes finished I/Q sample buffers produced by [`crate::engine::Engine`].
///
/// Implementors own whatever transport (file, USB bulk endpoint, a test
/// double) they deliver bytes to; `push` is called once per synthesis
/// iteration with that iteration's interleaved I/Q bytes.
pub trait Sink: Send {
    /// Delivers one iteration's worth of interleaved I/Q bytes.
    ///
    /// # Errors
    /// Returns [`SinkError`] if the underlying transport fails.
    fn push(&mut self, iq: &[u8]) -> Result<(), SinkError>;
}

/// Discards every buffer. Used by dry runs (`-v`-only invocations) and
/// tests that only care about the producer side.
#[derive(Debug, Default)]
pub struct NullSink {
    /// Total bytes discarded, for diagnostics.
    pub bytes_seen: u64,
}

impl Sink for NullSink {
    fn push(&mut self, iq: &[u8]) -> Result<(), SinkError> {
        self.bytes_seen += iq.len() as u64;
        Ok(())
    }
}

/// Appends every buffer to a file, unbuffered beyond the wrapped
/// [`BufWriter`]. Kept for the test harness and offline inspection, not as
/// a reintroduction of the `-o` file-output CLI flag.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Opens (truncating) `path` for binary I/Q output.
    ///
    /// # Errors
    /// Returns [`SinkError::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn push(&mut self, iq: &[u8]) -> Result<(), SinkError> {
        self.writer.write_all(iq)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NullSink, Sink};

    #[test]
    fn null_sink_counts_bytes() {
        let mut sink = NullSink::default();
        sink.push(&[0u8; 16]).unwrap();
        sink.push(&[0u8; 4]).unwrap();
        assert_eq!(sink.bytes_seen, 20);
    }
}
