use serde::Serialize;
use tracing::debug;

use super::frame::{FrameError, FrameKind, FrameValidator};

/// Error code reported by a healthy unit
pub const NO_ERROR: u16 = 0x8000;

/// Fault status, from a kind 0x04 frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub error_code: u16,

    #[serde(skip)]
    pub reserved_6_8: [u8; 3],
    #[serde(skip)]
    pub reserved_tail: Vec<u8>,
}

impl Default for ErrorState {
    fn default() -> Self {
        Self {
            error_code: NO_ERROR,
            reserved_6_8: [0; 3],
            reserved_tail: Vec::new(),
        }
    }
}

impl ErrorState {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::Error.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing error state payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::Error)?;

        Ok(Self {
            error_code: u16::from_be_bytes([frame[9], frame[10]]),
            reserved_6_8: [frame[6], frame[7], frame[8]],
            reserved_tail: frame[11..frame.len() - 1].to_vec(),
        })
    }

    pub fn is_abnormal(&self) -> bool {
        self.error_code != NO_ERROR
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_no_error() {
        let state = ErrorState::decode(&hex!("fc6201301004000000800000000000000000000000d9")).unwrap();
        assert_eq!(state.error_code, 0x8000);
        assert!(!state.is_abnormal());
    }

    #[test]
    fn test_abnormal() {
        let state = ErrorState::decode(&hex!("fc620130100400000041050000000000000000000013")).unwrap();
        assert_eq!(state.error_code, 0x4105);
        assert!(state.is_abnormal());
        assert_eq!(state.reserved_tail.len(), 10);
    }
}
