//! USB vendor request codes and device mode enums for the `HackRF` firmware
//! protocol.

/// `HackRF` firmware USB vendor request codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Request {
    SetTransceiverMode = 1,
    SampleRateSet = 6,
    BasebandFilterBandwidthSet = 7,
    BoardIdRead = 14,
    VersionStringRead = 15,
    SetFreq = 16,
    AmpEnable = 17,
    BoardPartidSerialnoRead = 18,
    SetLnaGain = 19,
    SetVgaGain = 20,
    SetTxvgaGain = 21,
    AntennaEnable = 23,
    SetHwSyncMode = 27,
    Reset = 28,
    ClkoutEnable = 30,
}

impl From<Request> for u8 {
    fn from(value: Request) -> Self {
        value as u8
    }
}

/// The device's current high-level operating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    #[default]
    Off,
    Rx,
    Tx,
}

/// The firmware's baseband transceiver state, set via
/// [`Request::SetTransceiverMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TransceiverMode {
    Off = 0,
    Receive = 1,
    Transmit = 2,
}

impl From<TransceiverMode> for u16 {
    fn from(value: TransceiverMode) -> Self {
        value as u16
    }
}
