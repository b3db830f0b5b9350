//! The producer/consumer handoff: a synthesis thread fills one 260 000
//! complex-sample buffer per 100 ms of simulated time; a sink thread drains
//! it. A single mutex plus two condition variables enforce strict
//! alternation — exactly one buffer in flight — per §5.

use std::sync::{Arc, Condvar, Mutex};

use log::{debug, warn};

use crate::sink::{Sink, SinkError};

/// Shared state guarded by one mutex: the buffer itself, its fill state,
/// and the cooperative shutdown flag.
struct Shared {
    buffer: Vec<u8>,
    /// `true` once the producer has finished filling `buffer` and the
    /// consumer may copy it out.
    full: bool,
    /// `true` once the consumer has copied `buffer` out and the producer
    /// may refill it.
    copied: bool,
    stop: bool,
}

/// The two-thread synthesis/sink pipeline described in §5.
pub struct Engine {
    state: Arc<Mutex<Shared>>,
    full_cv: Arc<Condvar>,
    copied_cv: Arc<Condvar>,
}

impl Engine {
    /// Creates an engine with a buffer sized for `bytes_per_iteration`
    /// (`4 * num_samples` for interleaved 16-bit I/Q).
    #[must_use]
    pub fn new(bytes_per_iteration: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(Shared {
                buffer: vec![0u8; bytes_per_iteration],
                full: false,
                copied: true,
                stop: false,
            })),
            full_cv: Arc::new(Condvar::new()),
            copied_cv: Arc::new(Condvar::new()),
        }
    }

    /// A handle the producer uses to fill and hand off buffers.
    #[must_use]
    pub fn producer(&self) -> Producer {
        Producer {
            state: Arc::clone(&self.state),
            full_cv: Arc::clone(&self.full_cv),
            copied_cv: Arc::clone(&self.copied_cv),
        }
    }

    /// Runs the consumer loop on the calling thread until `stop` is set,
    /// draining finished buffers into `sink`.
    pub fn run_consumer(&self, mut sink: impl Sink) {
        loop {
            let mut guard = self.state.lock().unwrap();
            while !guard.full && !guard.stop {
                guard = self.full_cv.wait(guard).unwrap();
            }
            if guard.stop && !guard.full {
                break;
            }
            let bytes = guard.buffer.clone();
            guard.full = false;
            guard.copied = true;
            let stop_after = guard.stop;
            drop(guard);
            self.copied_cv.notify_one();

            if let Err(err) = sink.push(&bytes) {
                warn!("sink push failed, stopping: {err}");
                let mut guard = self.state.lock().unwrap();
                guard.stop = true;
                drop(guard);
                self.full_cv.notify_one();
                self.copied_cv.notify_one();
                break;
            }
            if stop_after {
                break;
            }
        }
        debug!("consumer loop exited");
    }

    /// Sets `stop` and wakes both condition variables, per §5's
    /// cancellation protocol.
    pub fn request_stop(&self) {
        let mut guard = self.state.lock().unwrap();
        guard.stop = true;
        drop(guard);
        self.full_cv.notify_one();
        self.copied_cv.notify_one();
    }

    /// Returns `true` once a stop has been requested.
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.state.lock().unwrap().stop
    }
}

/// The producer's side of the handoff: fill `scratch`, then hand it off
/// atomically to the consumer.
pub struct Producer {
    state: Arc<Mutex<Shared>>,
    full_cv: Arc<Condvar>,
    copied_cv: Arc<Condvar>,
}

/// Errors relayed to the producer loop from [`SinkError`] surfaced by the
/// consumer thread.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The consumer signalled `stop` because its sink failed.
    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl Producer {
    /// Hands `filled` off to the consumer, blocking until the consumer has
    /// copied the previous buffer out (so the caller's next fill does not
    /// race the copy). Returns `false` once `stop` has been observed.
    #[must_use]
    pub fn hand_off(&self, filled: &[u8]) -> bool {
        let mut guard = self.state.lock().unwrap();
        while !guard.copied && !guard.stop {
            guard = self.copied_cv.wait(guard).unwrap();
        }
        if guard.stop {
            return false;
        }
        guard.buffer.copy_from_slice(filled);
        guard.full = true;
        guard.copied = false;
        drop(guard);
        self.full_cv.notify_one();
        true
    }

    /// `true` once a stop has been requested (checked by the producer at
    /// the top of each iteration).
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.state.lock().unwrap().stop
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, thread};

    use super::Engine;
    use crate::sink::Sink;

    struct CollectingSink {
        received: std::sync::Arc<Mutex<Vec<usize>>>,
    }

    impl Sink for CollectingSink {
        fn push(&mut self, iq: &[u8]) -> Result<(), crate::sink::SinkError> {
            self.received.lock().unwrap().push(iq.len());
            Ok(())
        }
    }

    #[test]
    fn hands_off_exactly_the_buffers_sent() {
        let engine = Engine::new(8);
        let producer = engine.producer();
        let received = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = CollectingSink {
            received: std::sync::Arc::clone(&received),
        };

        let consumer_handle = {
            let engine = &engine;
            thread::scope(|scope| {
                scope.spawn(move || {
                    engine.run_consumer(sink);
                });
                for i in 0..3u8 {
                    let buf = [i; 8];
                    assert!(producer.hand_off(&buf));
                }
                engine.request_stop();
            });
        };
        let _ = consumer_handle;
        assert_eq!(received.lock().unwrap().len(), 3);
    }
}
