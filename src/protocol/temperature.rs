//! Temperature encodings. Every value here is in tenths of a degree Celsius.
//!
//! Setpoints travel in two parallel forms. Older firmware only understands the
//! whole-degree "coarse" byte, newer firmware reads a half-degree "fine" byte.
//! Commands always carry both, derived from the same value.

/// Lowest setpoint a command can carry.
pub const SETPOINT_MIN: i16 = 160;
/// Highest setpoint a command can carry.
pub const SETPOINT_MAX: i16 = 310;

const COARSE_BASE: i16 = 31;
const FINE_OFFSET: i16 = 0x80;
const SENSOR_MAX: i16 = 400;

/// Decodes the whole-degree setpoint byte, stored as `31 - degrees`.
pub fn coarse_to_tenths(raw: u8) -> i16 {
    (COARSE_BASE - raw as i16) * 10
}

/// Decodes the half-degree setpoint byte. Zero means the unit doesn't report it.
pub fn fine_to_tenths(raw: u8) -> Option<i16> {
    if raw == 0 {
        None
    } else {
        Some((raw as i16 - FINE_OFFSET) * 5)
    }
}

/// Decodes a half-degree sensor reading, clamped to 0..=40 degrees.
pub fn sensor_to_tenths(raw: u8) -> i16 {
    (5 * (raw as i16 - FINE_OFFSET)).clamp(0, SENSOR_MAX)
}

/// Status-frame form of the whole-degree byte. Fractions are truncated.
pub fn tenths_to_coarse(tenths: i16) -> u8 {
    (COARSE_BASE - tenths.clamp(0, SETPOINT_MAX) / 10) as u8
}

/// Command-frame form of the whole-degree byte.
///
/// The setpoint is clamped to the commandable range. The high nibble is set
/// when the value has a fractional part, the low nibble is `31 - degrees`.
pub fn coarse_segment(tenths: i16) -> u8 {
    segment(tenths.clamp(SETPOINT_MIN, SETPOINT_MAX))
}

/// Whole-degree byte of a remote temperature reading. Like [`coarse_segment`],
/// but a reading above the top of the range keeps its half degree.
pub fn remote_coarse_segment(tenths: i16) -> u8 {
    segment(tenths.clamp(SETPOINT_MIN, SETPOINT_MAX + 5))
}

fn segment(tenths: i16) -> u8 {
    let fraction = if tenths % 10 == 0 { 0x00 } else { 0x10 };
    let degrees = (COARSE_BASE - tenths / 10) as u8;
    fraction | degrees
}

/// Half-degree byte, `0x80 + tenths / 5`. Not clamped to the setpoint range.
pub fn fine_segment(tenths: i16) -> u8 {
    (FINE_OFFSET + tenths / 5).clamp(0, u8::MAX as i16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(coarse_to_tenths(9), 220);
        assert_eq!(coarse_to_tenths(0), 310);
        assert_eq!(fine_to_tenths(0xac), Some(220));
        assert_eq!(fine_to_tenths(0xad), Some(225));
        assert_eq!(fine_to_tenths(0x00), None);
    }

    #[test]
    fn test_sensor_clamp() {
        assert_eq!(sensor_to_tenths(0xac), 220);
        assert_eq!(sensor_to_tenths(0x10), 0);
        assert_eq!(sensor_to_tenths(0x80), 0);
        assert_eq!(sensor_to_tenths(0xff), 400);
    }

    #[test]
    fn test_coarse_segment() {
        assert_eq!(coarse_segment(220), 0x09);
        assert_eq!(coarse_segment(225), 0x19);
        assert_eq!(coarse_segment(160), 0x0f);
        assert_eq!(coarse_segment(120), coarse_segment(160));
        assert_eq!(coarse_segment(350), 0x00);
    }

    #[test]
    fn test_remote_coarse_segment() {
        assert_eq!(remote_coarse_segment(210), 0x0a);
        assert_eq!(remote_coarse_segment(355), 0x10);
        assert_eq!(remote_coarse_segment(5), 0x0f);
        assert_eq!(coarse_segment(355), 0x00);
    }

    #[test]
    fn test_fine_segment() {
        assert_eq!(fine_segment(220), 0xac);
        assert_eq!(fine_segment(225), 0xad);
        assert_eq!(fine_segment(120), 0x98);
    }

    #[test]
    fn test_status_coarse() {
        assert_eq!(tenths_to_coarse(225), 9);
        assert_eq!(coarse_to_tenths(tenths_to_coarse(160)), 160);
    }
}
