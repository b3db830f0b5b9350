//! A [`gps::Sink`] that streams I/Q bytes to a HackRF over its bulk TX
//! endpoint.

use futures_lite::future::block_on;
use gps::{Sink, SinkError};
use libhackrf::HackRF;
use nusb::{
    Endpoint,
    transfer::{Bulk, Out},
};

/// Owns a tuned, streaming-mode `HackRF` and forwards every buffer handed
/// off by the synthesis loop to its bulk TX endpoint.
pub struct HackRfSink {
    device: HackRF,
    endpoint: Endpoint<Bulk, Out>,
}

impl HackRfSink {
    /// Opens `device` for transmission: enters TX mode and grabs the bulk
    /// OUT endpoint. `device` must already be tuned (frequency, sample
    /// rate, gains) by the caller.
    ///
    /// # Errors
    /// Returns [`SinkError::Io`] if entering TX mode or claiming the
    /// endpoint fails.
    pub fn open(mut device: HackRF) -> Result<Self, SinkError> {
        device
            .enter_tx_mode()
            .map_err(|err| SinkError::Io(std::io::Error::other(err)))?;
        let endpoint = device
            .tx_queue()
            .map_err(|err| SinkError::Io(std::io::Error::other(err)))?;
        Ok(Self { device, endpoint })
    }
}

impl Sink for HackRfSink {
    fn push(&mut self, iq: &[u8]) -> Result<(), SinkError> {
        self.endpoint.submit(iq.to_vec());
        let completion = block_on(self.endpoint.next_complete());
        completion
            .status
            .map_err(|err| SinkError::Io(std::io::Error::other(err)))
    }
}

impl Drop for HackRfSink {
    fn drop(&mut self) {
        let _ = self.device.stop_tx();
    }
}
