use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::{
    frame::{FrameError, FrameKind, MIN_FRAME_LEN},
    EnergyState, ErrorState, GeneralState, Reserved5State, Reserved9State, SensorState,
};

/// One decoded status frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateFrame {
    General(GeneralState),
    Sensor(SensorState),
    Error(ErrorState),
    Energy(EnergyState),
    Reserved5(Reserved5State),
    Reserved9(Reserved9State),
    /// Not a kind we decode; dropped without error
    Unrecognized,
}

impl StateFrame {
    /// Picks a decoder by discriminator. Fails only when the frame claims a
    /// known kind but doesn't hold up to validation.
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        Ok(if GeneralState::is_kind(frame) {
            StateFrame::General(GeneralState::decode(frame)?)
        } else if SensorState::is_kind(frame) {
            StateFrame::Sensor(SensorState::decode(frame)?)
        } else if ErrorState::is_kind(frame) {
            StateFrame::Error(ErrorState::decode(frame)?)
        } else if EnergyState::is_kind(frame) {
            StateFrame::Energy(EnergyState::decode(frame)?)
        } else if Reserved5State::is_kind(frame) {
            StateFrame::Reserved5(Reserved5State::decode(frame)?)
        } else if Reserved9State::is_kind(frame) {
            StateFrame::Reserved9(Reserved9State::decode(frame)?)
        } else {
            StateFrame::Unrecognized
        })
    }

    pub fn kind(&self) -> Option<FrameKind> {
        Some(match self {
            StateFrame::General(_) => FrameKind::General,
            StateFrame::Sensor(_) => FrameKind::Sensor,
            StateFrame::Error(_) => FrameKind::Error,
            StateFrame::Energy(_) => FrameKind::Energy,
            StateFrame::Reserved5(_) => FrameKind::Reserved5,
            StateFrame::Reserved9(_) => FrameKind::Reserved9,
            StateFrame::Unrecognized => return None,
        })
    }
}

/// A frame from a batch that failed to decode
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFrame {
    pub index: usize,
    pub error: FrameError,
}

/// Everything one status response says about a unit.
///
/// Rebuilt from scratch for every response; nothing carries over between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedState {
    pub general: Option<GeneralState>,
    pub sensors: Option<SensorState>,
    pub errors: Option<ErrorState>,
    pub energy: Option<EnergyState>,
    pub reserved5: Option<Reserved5State>,
    pub reserved9: Option<Reserved9State>,

    pub mac: String,
    pub serial: String,
    pub rssi: String,
    pub app_version: String,
    #[serde(serialize_with = "serialize_hex_list")]
    pub profile_codes: Vec<Vec<u8>>,

    #[serde(skip)]
    pub rejected: Vec<RejectedFrame>,
}

fn serialize_hex_list<S: Serializer>(codes: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(codes.iter().map(hex::encode))
}

impl AggregatedState {
    /// Folds an ordered list of raw frames. A later frame of a kind replaces an
    /// earlier one. A frame that fails to decode is logged, recorded in
    /// `rejected`, and doesn't stop the rest of the batch.
    pub fn build<I, F>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut state = AggregatedState::default();
        for (index, frame) in frames.into_iter().enumerate() {
            state.push(index, StateFrame::decode(frame.as_ref()), frame.as_ref());
        }
        state.finish()
    }

    /// Same as [`AggregatedState::build`], for hex strings as they come out of
    /// the response envelope.
    pub fn from_hex_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = AggregatedState::default();
        for (index, code) in codes.into_iter().enumerate() {
            match hex::decode(code.as_ref().trim()) {
                Ok(frame) => state.push(index, StateFrame::decode(&frame), &frame),
                Err(e) => state.push(index, Err(e.into()), &[]),
            }
        }
        state.finish()
    }

    pub fn with_identity(mut self, mac: impl Into<String>, serial: impl Into<String>) -> Self {
        self.mac = mac.into();
        self.serial = serial.into();
        self
    }

    pub fn with_profile_codes(mut self, codes: Vec<Vec<u8>>) -> Self {
        self.profile_codes = codes;
        self
    }

    /// Stores a decoded frame, replacing any earlier one of the same kind.
    pub fn insert(&mut self, frame: StateFrame) {
        match frame {
            StateFrame::General(s) => self.general = Some(s),
            StateFrame::Sensor(s) => self.sensors = Some(s),
            StateFrame::Error(s) => self.errors = Some(s),
            StateFrame::Energy(s) => self.energy = Some(s),
            StateFrame::Reserved5(s) => self.reserved5 = Some(s),
            StateFrame::Reserved9(s) => self.reserved9 = Some(s),
            StateFrame::Unrecognized => {}
        }
    }

    fn push(&mut self, index: usize, decoded: Result<StateFrame, FrameError>, raw: &[u8]) {
        match decoded {
            Ok(StateFrame::Unrecognized) => {
                let discriminator = raw.get(MIN_FRAME_LEN - 1).copied();
                debug!(index, ?discriminator, "Ignoring unknown code value: {}", hex::encode(raw));
            }
            Ok(frame) => {
                debug!(index, kind = ?frame.kind(), "Decoded frame");
                self.insert(frame);
            }
            Err(error) => {
                warn!(index, "Dropping frame: {error}");
                self.rejected.push(RejectedFrame { index, error });
            }
        }
    }

    fn finish(mut self) -> Self {
        if let Some(energy) = self.energy.as_mut() {
            energy.estimated_power_watts = energy.estimate_power(self.general.as_ref());
        }
        self
    }
}
