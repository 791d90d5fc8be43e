use serde::Serialize;
use tracing::debug;

use super::{
    frame::{FrameError, FrameKind, FrameValidator},
    DriveMode, FanSpeed, GeneralState,
};

/// Flat estimate while the compressor is stopped
const STANDBY_WATTS: u32 = 10;
/// Controller and sensor draw, added to every running estimate
const BASELINE_WATTS: u32 = 20;

/// Compressor operating state, from a kind 0x06 frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergyState {
    pub compressor_frequency: u8,
    pub operating: bool,

    /// Raw figure at offsets 10..12. Follows the outdoor unit's consumption
    /// roughly, and is reported by the first indoor unit only.
    pub reported_power_watts: u16,

    /// Approximation from frequency, mode and fan speed; never a metered value.
    /// Filled in once the general state of the same response is known.
    pub estimated_power_watts: Option<u32>,

    #[serde(skip)]
    pub reserved_6_7: [u8; 2],
    #[serde(skip)]
    pub reserved_tail: Vec<u8>,
}

fn base_power(mode: DriveMode) -> u32 {
    match mode {
        DriveMode::Heater => 1000,
        DriveMode::Cooler => 900,
        DriveMode::Auto | DriveMode::AutoCooler | DriveMode::AutoHeater => 950,
        DriveMode::Dehum => 600,
        DriveMode::Fan => 0,
    }
}

fn fan_power(speed: FanSpeed) -> u32 {
    match speed {
        FanSpeed::Auto => 30,
        FanSpeed::Level1 => 10,
        FanSpeed::Level2 => 20,
        FanSpeed::Level3 => 30,
        FanSpeed::Level4 => 40,
        FanSpeed::Full => 50,
    }
}

/// Rough electrical draw in watts for a compressor frequency and indoor settings.
pub fn estimate_power(frequency: u8, mode: DriveMode, fan: FanSpeed) -> u32 {
    if frequency == 0 {
        return STANDBY_WATTS;
    }
    base_power(mode) * frequency as u32 / 255 + fan_power(fan) + BASELINE_WATTS
}

impl EnergyState {
    pub fn is_kind(frame: &[u8]) -> bool {
        FrameKind::Energy.matches(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        debug!("Parsing energy state payload: {}", hex::encode(frame));
        FrameValidator::validate_kind(frame, FrameKind::Energy)?;

        Ok(Self {
            compressor_frequency: frame[8],
            operating: frame[9] != 0,
            reported_power_watts: u16::from_be_bytes([frame[10], frame[11]]),
            estimated_power_watts: None,
            reserved_6_7: [frame[6], frame[7]],
            reserved_tail: frame[12..frame.len() - 1].to_vec(),
        })
    }

    /// Estimate for this frame's frequency under the given settings. A stopped
    /// compressor needs no settings, otherwise `None` without them.
    pub fn estimate_power(&self, general: Option<&GeneralState>) -> Option<u32> {
        match (self.compressor_frequency, general) {
            (0, _) => Some(STANDBY_WATTS),
            (frequency, Some(general)) => Some(estimate_power(
                frequency,
                general.drive_mode,
                general.fan_speed,
            )),
            (_, None) => None,
        }
    }
}
