//! Frame kinds whose meaning isn't known yet. Their bytes are kept as received.

use serde::Serialize;
use tracing::debug;

use super::frame::{FrameError, FrameKind, FrameValidator};

/// Kind 0x05 frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reserved5State {
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
}

impl Reserved5State {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::Reserved5.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing reserved 0x05 payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::Reserved5)?;

        Ok(Self {
            payload: frame[6..frame.len() - 1].to_vec(),
        })
    }
}

/// Kind 0x09 frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reserved9State {
    /// 0 when off, 1 when on but idle, rising with heating or cooling demand
    pub demand_level: u8,

    #[serde(skip)]
    pub reserved_6_8: [u8; 3],
    #[serde(skip)]
    pub reserved_tail: Vec<u8>,
}

impl Reserved9State {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::Reserved9.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing reserved 0x09 payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::Reserved9)?;

        Ok(Self {
            demand_level: frame[9],
            reserved_6_8: [frame[6], frame[7], frame[8]],
            reserved_tail: frame[10..frame.len() - 1].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_reserved5() {
        let state = Reserved5State::decode(&hex!("fc620130100500112233445559")).unwrap();
        assert_eq!(state.payload, hex!("001122334455").to_vec());
    }

    #[test]
    fn test_reserved9() {
        let state = Reserved9State::decode(&hex!("fc620130100900000003000000000000000000000051")).unwrap();
        assert_eq!(state.demand_level, 3);
        assert_eq!(state.reserved_tail.len(), 11);
    }
}
