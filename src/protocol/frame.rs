use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tracing::warn;

/// First byte of every frame
pub const MARKER: u8 = 0xfc;

/// Group codes seen in status responses
pub static GROUP_CODES: [u8; 2] = [0x62, 0x7b];

/// Bytes 2..=4 of every frame
pub static HEADER: [u8; 3] = [0x01, 0x30, 0x10];

/// Nothing past the marker is trusted below this length
pub const MIN_FRAME_LEN: usize = 6;

/// The checksum only ever covers this many bytes after the marker
pub const CHECKSUM_WINDOW: usize = 20;

const GROUP_OFFSET: usize = 1;
const HEADER_OFFSET: usize = 2;
const DISCRIMINATOR_OFFSET: usize = 5;

/// Status frame kinds, keyed by the discriminator at offset 5.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::AsRefStr)]
pub enum FrameKind {
    General = 0x02,
    Sensor = 0x03,
    Error = 0x04,
    Reserved5 = 0x05,
    Energy = 0x06,
    Reserved9 = 0x09,
}

impl FrameKind {
    pub fn from_discriminator(value: u8) -> Option<Self> {
        Some(match value {
            0x02 => FrameKind::General,
            0x03 => FrameKind::Sensor,
            0x04 => FrameKind::Error,
            0x05 => FrameKind::Reserved5,
            0x06 => FrameKind::Energy,
            0x09 => FrameKind::Reserved9,
            _ => return None,
        })
    }

    /// Shortest frame, checksum included, that holds every field of this kind.
    pub fn min_len(self) -> usize {
        match self {
            FrameKind::General | FrameKind::Sensor => 21,
            FrameKind::Energy => 13,
            FrameKind::Error => 12,
            FrameKind::Reserved9 => 11,
            FrameKind::Reserved5 => 7,
        }
    }

    /// Tests the group code and discriminator without validating anything else.
    pub fn matches(self, frame: &[u8]) -> bool {
        frame.len() >= MIN_FRAME_LEN
            && GROUP_CODES.contains(&frame[GROUP_OFFSET])
            && frame[DISCRIMINATOR_OFFSET] == self as u8
    }

    /// Kind of a status frame, if it is one we know.
    pub fn of(frame: &[u8]) -> Option<Self> {
        if frame.len() < MIN_FRAME_LEN || !GROUP_CODES.contains(&frame[GROUP_OFFSET]) {
            return None;
        }
        FrameKind::from_discriminator(frame[DISCRIMINATOR_OFFSET])
    }
}

impl TryFrom<u8> for FrameKind {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, FrameError> {
        FrameKind::from_discriminator(value).ok_or(FrameError::UnrecognizedDiscriminator(value))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("bad frame marker 0x{0:02x}")]
    BadMarker(u8),

    #[error("invalid checksum (expected {expected:02x}, actual: {actual:02x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("unrecognized discriminator 0x{0:02x}")]
    UnrecognizedDiscriminator(u8),

    #[error("not a {expected:?} frame: discriminator is 0x{actual:02x}")]
    WrongKind { expected: FrameKind, actual: u8 },

    #[error("failed to decode hex frame: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A fixed byte that didn't hold its usual value. Decoding carries on regardless.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("byte {offset} is 0x{actual:02x}, expected one of {expected:02x?}")]
pub struct StructuralMismatch {
    pub offset: usize,
    pub actual: u8,
    pub expected: &'static [u8],
}

/// Checksum of the bytes following the marker, checksum byte excluded.
pub fn checksum(body: &[u8]) -> u8 {
    let window = &body[..body.len().min(CHECKSUM_WINDOW)];
    let sum = window.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

pub struct FrameValidator;

impl FrameValidator {
    /// Checks length, marker and checksum, which are fatal, then the group code
    /// and fixed header, which are only reported back.
    pub fn validate(frame: &[u8], min_len: usize) -> Result<Vec<StructuralMismatch>, FrameError> {
        let min = min_len.max(MIN_FRAME_LEN);
        if frame.len() < min {
            return Err(FrameError::TooShort {
                len: frame.len(),
                min,
            });
        }

        if frame[0] != MARKER {
            return Err(FrameError::BadMarker(frame[0]));
        }

        let (body, trailer) = frame[1..].split_at(frame.len() - 2);
        let expected = checksum(body);
        if expected != trailer[0] {
            return Err(FrameError::ChecksumMismatch {
                expected,
                actual: trailer[0],
            });
        }

        let mut mismatches = Vec::new();
        if !GROUP_CODES.contains(&frame[GROUP_OFFSET]) {
            mismatches.push(StructuralMismatch {
                offset: GROUP_OFFSET,
                actual: frame[GROUP_OFFSET],
                expected: &GROUP_CODES,
            });
        }
        for (i, expected) in HEADER.iter().enumerate() {
            let offset = HEADER_OFFSET + i;
            if frame[offset] != *expected {
                mismatches.push(StructuralMismatch {
                    offset,
                    actual: frame[offset],
                    expected: std::slice::from_ref(expected),
                });
            }
        }

        Ok(mismatches)
    }

    /// Full validation for one frame kind, as run by each decoder. Mismatches are logged.
    pub fn validate_kind(frame: &[u8], kind: FrameKind) -> Result<(), FrameError> {
        let mismatches = FrameValidator::validate(frame, kind.min_len())?;
        for mismatch in &mismatches {
            warn!(kind = kind.as_ref(), "{mismatch}");
        }

        let discriminator = frame[DISCRIMINATOR_OFFSET];
        if discriminator != kind as u8 {
            return Err(FrameError::WrongKind {
                expected: kind,
                actual: discriminator,
            });
        }

        Ok(())
    }
}

/// Starts a status frame of the given kind, up to and including the discriminator.
pub(crate) fn status_header(kind: FrameKind) -> BytesMut {
    let mut buf = BytesMut::with_capacity(22);
    buf.put_u8(MARKER);
    buf.put_u8(GROUP_CODES[0]);
    buf.put_slice(&HEADER);
    buf.put_u8(kind as u8);
    buf
}

/// Appends the checksum to a frame that starts with the marker.
pub(crate) fn seal(mut buf: BytesMut) -> Bytes {
    let sum = checksum(&buf[1..]);
    buf.put_u8(sum);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const ERROR_FRAME: [u8; 22] = hex!("fc6201301004000000800000000000000000000000d9");

    #[test]
    fn test_checksum() {
        let known_frames: &[&[u8]] = &[
            &ERROR_FRAME,
            &hex!("fc410130100101020100090000000000000000ac4183"),
            &hex!("fc6201301006000000000001004100004200000000d3"),
        ];
        for frame in known_frames {
            assert_eq!(checksum(&frame[1..frame.len() - 1]), frame[frame.len() - 1]);
        }
    }

    #[test]
    fn test_checksum_window() {
        let mut long = ERROR_FRAME[..21].to_vec();
        long.extend_from_slice(&[0x11, 0x22, 0x33]);
        let reference = checksum(&long[1..]);

        for offset in 21..long.len() {
            let mut mutated = long.clone();
            mutated[offset] ^= 0xff;
            assert_eq!(checksum(&mutated[1..]), reference, "offset {}", offset);
        }

        let mut mutated = long.clone();
        mutated[20] ^= 0x01;
        assert_ne!(checksum(&mutated[1..]), reference);
    }

    #[test]
    fn test_validate() {
        assert_eq!(FrameValidator::validate(&ERROR_FRAME, 12), Ok(vec![]));

        assert_eq!(
            FrameValidator::validate(&ERROR_FRAME[..5], 0),
            Err(FrameError::TooShort { len: 5, min: 6 })
        );

        let mut bad_marker = ERROR_FRAME;
        bad_marker[0] = 0xfd;
        assert_eq!(
            FrameValidator::validate(&bad_marker, 12),
            Err(FrameError::BadMarker(0xfd))
        );

        let mut bad_checksum = ERROR_FRAME;
        bad_checksum[21] = 0x00;
        assert_eq!(
            FrameValidator::validate(&bad_checksum, 12),
            Err(FrameError::ChecksumMismatch {
                expected: 0xd9,
                actual: 0x00
            })
        );
    }

    #[test]
    fn test_header_mismatch_is_not_fatal() {
        let mut frame = ERROR_FRAME.to_vec();
        frame[3] = 0x31;
        frame[4] = 0x11;
        let len = frame.len();
        frame[len - 1] = checksum(&frame[1..len - 1]);

        let mismatches = FrameValidator::validate(&frame, 12).unwrap();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].offset, 3);
        assert_eq!(mismatches[0].actual, 0x31);
        assert_eq!(mismatches[1].offset, 4);
        assert!(FrameValidator::validate_kind(&frame, FrameKind::Error).is_ok());
    }

    #[test]
    fn test_wrong_kind() {
        assert_eq!(
            FrameValidator::validate_kind(&ERROR_FRAME, FrameKind::General),
            Err(FrameError::WrongKind {
                expected: FrameKind::General,
                actual: 0x04
            })
        );
        assert_eq!(
            FrameValidator::validate_kind(&ERROR_FRAME[..11], FrameKind::Error),
            Err(FrameError::TooShort { len: 11, min: 12 })
        );
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(FrameKind::of(&ERROR_FRAME), Some(FrameKind::Error));
        assert!(FrameKind::Error.matches(&ERROR_FRAME));
        assert!(!FrameKind::General.matches(&ERROR_FRAME));
        assert_eq!(FrameKind::of(&hex!("fc6201301007")), None);
        assert_eq!(FrameKind::of(&hex!("fc4101301002")), None);
        assert_eq!(FrameKind::try_from(0x06), Ok(FrameKind::Energy));
        assert_eq!(
            FrameKind::try_from(0x07),
            Err(FrameError::UnrecognizedDiscriminator(0x07))
        );
    }

    #[test]
    fn test_seal() {
        let mut buf = status_header(FrameKind::Error);
        buf.put_slice(&hex!("000000800000000000000000000000"));
        assert_eq!(&seal(buf)[..], &ERROR_FRAME[..]);
    }
}
