use bytes::{BufMut, Bytes};
use serde::Serialize;
use tracing::debug;

use super::{
    frame::{self, FrameError, FrameKind, FrameValidator},
    temperature, DriveMode, FanSpeed, HorizontalVane, PowerState, VerticalVane,
};

/// Raw mode byte the unit reports for plain AUTO
const MODE_AUTO_RAW: u8 = 0x08;
const MODE_MASK: u8 = 0x07;
const MODE_SENSOR_BIT: u8 = 0x08;

const WIDE_VANE_MASK: u8 = 0xf0;
const WIDE_VANE_ADJUST: u8 = 0x80;

/// Settings of the indoor unit, from a kind 0x02 frame
///
/// ```text
/// offset  field
///  6..8   reserved
///  8      power
///  9      mode, bit 3 is the i-See sensor flag
/// 10      setpoint, whole degrees
/// 11      fan speed
/// 12      vertical vane
/// 13..15  reserved
/// 15      horizontal vane, 0x80 marks a wide vane adjustment
/// 16      setpoint, half degrees (0 when unsupported)
/// 17      dehumidifier level
/// 18      power saving
/// 19      wind and wind break direction
/// 20..    reserved
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralState {
    pub power: PowerState,
    pub drive_mode: DriveMode,

    /// Mode byte as received. Kept in step with `drive_mode` and `sensor_active`.
    pub mode_raw: u8,

    /// Set when the i-See occupancy sensor influences operation
    pub sensor_active: bool,

    /// Target temperature in tenths of a degree
    pub temperature_tenths: i16,

    /// Whether the unit reported the half-degree setpoint encoding
    pub fine_temperature: bool,

    pub fan_speed: FanSpeed,
    pub vertical_vane: VerticalVane,
    pub horizontal_vane: HorizontalVane,
    pub wide_vane_adjustment: bool,

    /// 0-100
    pub dehumidifier_level: u8,
    pub power_saving: bool,
    pub wind_break: u8,

    #[serde(skip)]
    pub reserved_6_7: [u8; 2],
    #[serde(skip)]
    pub reserved_13_14: [u8; 2],
    #[serde(skip)]
    pub reserved_tail: Vec<u8>,
}

impl Default for GeneralState {
    fn default() -> Self {
        Self {
            power: PowerState::Off,
            drive_mode: DriveMode::Auto,
            mode_raw: MODE_AUTO_RAW,
            sensor_active: false,
            temperature_tenths: 220,
            fine_temperature: true,
            fan_speed: FanSpeed::Auto,
            vertical_vane: VerticalVane::Auto,
            horizontal_vane: HorizontalVane::Auto,
            wide_vane_adjustment: false,
            dehumidifier_level: 0,
            power_saving: false,
            wind_break: 0,
            reserved_6_7: [0; 2],
            reserved_13_14: [0; 2],
            reserved_tail: Vec::new(),
        }
    }
}

/// Splits the mode byte into the drive mode and the i-See flag.
pub fn parse_mode(raw: u8) -> (DriveMode, bool) {
    // Plain AUTO shares its code with the sensor bit
    if raw == MODE_AUTO_RAW {
        return (DriveMode::Auto, false);
    }

    (
        DriveMode::from(raw & MODE_MASK),
        raw & MODE_SENSOR_BIT != 0,
    )
}

/// Mode byte for a drive mode and i-See flag. AUTO cannot carry the flag.
pub fn mode_byte(mode: DriveMode, sensor_active: bool) -> u8 {
    match mode {
        DriveMode::Auto => MODE_AUTO_RAW,
        mode => {
            let sensor = if sensor_active { MODE_SENSOR_BIT } else { 0 };
            (mode as u8 & MODE_MASK) | sensor
        }
    }
}

impl GeneralState {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::General.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing general state payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::General)?;

        let (drive_mode, sensor_active) = parse_mode(frame[9]);
        let coarse = temperature::coarse_to_tenths(frame[10]);
        let fine = temperature::fine_to_tenths(frame[16]);

        Ok(Self {
            power: PowerState::from(frame[8]),
            drive_mode,
            mode_raw: frame[9],
            sensor_active,
            temperature_tenths: fine.unwrap_or(coarse),
            fine_temperature: fine.is_some(),
            fan_speed: FanSpeed::from(frame[11]),
            vertical_vane: VerticalVane::from(frame[12]),
            horizontal_vane: HorizontalVane::from(frame[15]),
            wide_vane_adjustment: frame[15] & WIDE_VANE_MASK == WIDE_VANE_ADJUST,
            dehumidifier_level: frame[17],
            power_saving: frame[18] > 0,
            wind_break: frame[19],
            reserved_6_7: [frame[6], frame[7]],
            reserved_13_14: [frame[13], frame[14]],
            reserved_tail: frame[20..frame.len() - 1].to_vec(),
        })
    }

    /// Sets the drive mode, keeping the raw mode byte consistent.
    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.drive_mode = mode;
        self.mode_raw = mode_byte(mode, self.sensor_active);
    }

    /// Temperature in degrees, for display.
    pub fn temperature(&self) -> f32 {
        self.temperature_tenths as f32 / 10.0
    }

    /// Encodes this state as the status frame a unit would report, reserved
    /// spans included.
    pub fn to_frame(&self) -> Bytes {
        let mut buf = frame::status_header(FrameKind::General);
        buf.put_slice(&self.reserved_6_7);
        buf.put_u8(self.power as u8);
        buf.put_u8(self.reported_mode_byte());
        buf.put_u8(temperature::tenths_to_coarse(self.temperature_tenths));
        buf.put_u8(self.fan_speed as u8);
        buf.put_u8(self.vertical_vane as u8);
        buf.put_slice(&self.reserved_13_14);

        let adjust = if self.wide_vane_adjustment {
            WIDE_VANE_ADJUST
        } else {
            0
        };
        buf.put_u8(self.horizontal_vane as u8 | adjust);

        buf.put_u8(if self.fine_temperature {
            temperature::fine_segment(self.temperature_tenths)
        } else {
            0
        });
        buf.put_u8(self.dehumidifier_level);
        buf.put_u8(self.power_saving as u8);
        buf.put_u8(self.wind_break);
        buf.put_slice(&self.reserved_tail);
        frame::seal(buf)
    }

    /// The received mode byte when it still says the same thing, a fresh one otherwise.
    fn reported_mode_byte(&self) -> u8 {
        if parse_mode(self.mode_raw) == (self.drive_mode, self.sensor_active) {
            self.mode_raw
        } else {
            mode_byte(self.drive_mode, self.sensor_active)
        }
    }
}
