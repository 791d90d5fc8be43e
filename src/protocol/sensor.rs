use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::debug;

use super::{
    frame::{FrameError, FrameKind, FrameValidator},
    temperature,
};

/// Outside readings below this raw value mean there is no outdoor sensor
const OUTSIDE_UNAVAILABLE_BELOW: u8 = 16;

/// Firmware revisions disagree on what bytes 15..19 of a sensor frame hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SensorLayout {
    /// A big-endian 32 bit count of operating minutes
    #[default]
    RuntimeCounter,
    /// Two flag bytes: thermal sensor, then secondary fan speed
    ThermalFlags,
}

/// Bytes 15..19 of a sensor frame, read with a given [`SensorLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSecondary {
    RuntimeMinutes(u32),
    Flags {
        thermal_sensor_active: bool,
        secondary_fan_speed: bool,
    },
}

/// Temperature readings, from a kind 0x03 frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    /// None when the unit has no outdoor sensor
    pub outside_temperature_tenths: Option<i16>,
    pub room_temperature_tenths: i16,

    /// Whole-degree inside reading at offset 8
    pub inside_coarse_tenths: i16,
    /// Half-degree inside reading at offset 11, moves together with the coarse one
    pub inside_fine_tenths: i16,

    /// Revision dependent, see [`SensorLayout`]
    pub secondary: [u8; 4],

    #[serde(skip)]
    pub reserved_6_7: [u8; 2],
    #[serde(skip)]
    pub reserved_9: u8,
    #[serde(skip)]
    pub reserved_13_14: [u8; 2],
    #[serde(skip)]
    pub reserved_tail: Vec<u8>,
}

impl SensorState {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::Sensor.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing sensor state payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::Sensor)?;

        let outside = frame[10];
        Ok(Self {
            outside_temperature_tenths: if outside < OUTSIDE_UNAVAILABLE_BELOW {
                None
            } else {
                Some(temperature::sensor_to_tenths(outside))
            },
            room_temperature_tenths: temperature::sensor_to_tenths(frame[12]),
            inside_coarse_tenths: (10 + frame[8] as i16) * 10,
            inside_fine_tenths: (frame[11] as i16 - 0x80) * 5,
            secondary: [frame[15], frame[16], frame[17], frame[18]],
            reserved_6_7: [frame[6], frame[7]],
            reserved_9: frame[9],
            reserved_13_14: [frame[13], frame[14]],
            reserved_tail: frame[19..frame.len() - 1].to_vec(),
        })
    }

    /// Secondary region read as a runtime counter.
    pub fn runtime_minutes(&self) -> u32 {
        u32::from_be_bytes(self.secondary)
    }

    /// Secondary region read as flags: thermal sensor active.
    pub fn thermal_sensor_active(&self) -> bool {
        self.secondary[0] & 0x01 != 0
    }

    /// Secondary region read as flags: secondary fan speed indicator.
    pub fn secondary_fan_speed(&self) -> bool {
        self.secondary[1] & 0x01 != 0
    }

    pub fn secondary(&self, layout: SensorLayout) -> SensorSecondary {
        match layout {
            SensorLayout::RuntimeCounter => SensorSecondary::RuntimeMinutes(self.runtime_minutes()),
            SensorLayout::ThermalFlags => SensorSecondary::Flags {
                thermal_sensor_active: self.thermal_sensor_active(),
                secondary_fan_speed: self.secondary_fan_speed(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use hex_literal::hex;

    use super::*;

    const SENSORS: [u8; 22] = hex!("fc620130100300000c00a5acad0000000123450000e7");

    #[test]
    fn test_decode() {
        let state = SensorState::decode(&SENSORS).unwrap();
        assert_eq!(state.outside_temperature_tenths, Some(185));
        assert_eq!(state.room_temperature_tenths, 225);
        assert_eq!(state.inside_coarse_tenths, 220);
        assert_eq!(state.inside_fine_tenths, 220);
        assert_eq!(state.reserved_tail, vec![0x00, 0x00]);
    }

    #[test]
    fn test_outside_unavailable() {
        let frame = hex!("fc620130100300000c000aacad000000012345000082");
        let state = SensorState::decode(&frame).unwrap();
        assert_eq!(state.outside_temperature_tenths, None);
    }

    #[test]
    fn test_secondary_layouts() {
        let state = SensorState::decode(&SENSORS).unwrap();
        assert_eq!(
            state.secondary(SensorLayout::RuntimeCounter),
            SensorSecondary::RuntimeMinutes(0x0001_2345)
        );
        assert_eq!(
            state.secondary(SensorLayout::ThermalFlags),
            SensorSecondary::Flags {
                thermal_sensor_active: false,
                secondary_fan_speed: true,
            }
        );
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(
            SensorLayout::from_str("thermal-flags").unwrap(),
            SensorLayout::ThermalFlags
        );
        assert_eq!(SensorLayout::RuntimeCounter.as_ref(), "runtime-counter");
    }
}
