//! Reads hex encoded frames, one per line, such as a capture pasted from a log.
//!
//! Blank lines and lines starting with `#` are skipped. Whitespace inside a
//! line is ignored so `fc 62 01 30 ...` reads the same as `fc620130...`.

use std::io::{BufRead, BufReader, Read};

use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinesError {
    #[error("line {line}: failed to decode hex string: {source}")]
    HexDecodeError {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("EOF")]
    EOF,
}

pub struct Lines<R> {
    reader: BufReader<R>,
    line: usize,
}

impl<R: Read> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: 0,
        }
    }

    /// Next frame, or [`LinesError::EOF`] once the input is exhausted.
    pub fn recv(&mut self) -> Result<Bytes, LinesError> {
        let mut input = String::new();
        loop {
            input.clear();
            if self.reader.read_line(&mut input)? == 0 {
                return Err(LinesError::EOF);
            }
            self.line += 1;

            let trimmed = input.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return decode_line(trimmed, self.line);
        }
    }

    /// Reads every remaining frame, stopping at the first bad line.
    pub fn collect_frames(mut self) -> Result<Vec<Bytes>, LinesError> {
        let mut frames = Vec::new();
        loop {
            match self.recv() {
                Ok(frame) => frames.push(frame),
                Err(LinesError::EOF) => return Ok(frames),
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Iterator for Lines<R> {
    type Item = Result<Bytes, LinesError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.recv() {
            Err(LinesError::EOF) => None,
            other => Some(other),
        }
    }
}

fn decode_line(input: &str, line: usize) -> Result<Bytes, LinesError> {
    let compact: String = input.split_whitespace().collect();
    let decoded = hex::decode(compact)
        .map_err(|source| LinesError::HexDecodeError { line, source })?;
    Ok(Bytes::from(decoded))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_reads_frames() {
        let input = "\
# captured from a living room unit
fc6201301004000000800000000000000000000000d9

FC 62 01 30 10 09 00 00 00 03 00 00 00 00 00 00 00 00 00 00 00 51
";
        let frames = Lines::new(input.as_bytes()).collect_frames().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..], &hex!("fc6201301004000000800000000000000000000000d9"));
        assert_eq!(frames[1][5], 0x09);
    }

    #[test]
    fn test_bad_line() {
        let mut lines = Lines::new("fc62\nzz\nfc\n".as_bytes());
        assert!(lines.recv().is_ok());
        assert!(matches!(
            lines.recv(),
            Err(LinesError::HexDecodeError { line: 2, .. })
        ));
        assert!(lines.recv().is_ok());
        assert!(matches!(lines.recv(), Err(LinesError::EOF)));
    }

    #[test]
    fn test_iterator_stops_at_eof() {
        let frames: Vec<_> = Lines::new("fc\n\nfd\n".as_bytes()).collect();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.is_ok()));
    }
}
