//! Codec for the local-network control protocol spoken by Mitsubishi heat pumps
//! behind a MAC-577IF style WiFi adapter.
//!
//! Status responses carry a list of frames, each one describing a slice of the
//! unit's state. They are folded into an [`AggregatedState`]. Commands are built
//! from a known [`GeneralState`] plus a set of overrides by the [`CommandEncoder`].
//!
//! The protocol has no request identifier, so responses can't be matched to
//! requests. Callers must keep at most one exchange in flight per device.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

pub mod aggregate;
pub mod command;
pub mod energy;
pub mod fault;
pub mod frame;
pub mod general;
pub mod reserved;
pub mod sensor;
pub mod temperature;

pub use aggregate::{AggregatedState, RejectedFrame, StateFrame};
pub use command::{
    CommandEncoder, CommandFrame, EncodedCommand, Extend08Controls, GeneralControls,
    GeneralOverrides,
};
pub use energy::EnergyState;
pub use fault::ErrorState;
pub use frame::{FrameError, FrameKind, FrameValidator, StructuralMismatch};
pub use general::GeneralState;
pub use reserved::{Reserved5State, Reserved9State};
pub use sensor::{SensorLayout, SensorSecondary, SensorState};

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    #[default]
    Off = 0x00,
    On = 0x01,
}

impl From<u8> for PowerState {
    fn from(value: u8) -> Self {
        // Some firmware reports 0x02 while the unit is starting up
        match value {
            0x01 | 0x02 => PowerState::On,
            _ => PowerState::Off,
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriveMode {
    #[default]
    Auto = 0x08,
    Heater = 0x01,
    Dehum = 0x02,
    Cooler = 0x03,
    Fan = 0x07,
    AutoCooler = 0x1b,
    AutoHeater = 0x19,
}

impl From<u8> for DriveMode {
    fn from(value: u8) -> Self {
        match value {
            0x08 => DriveMode::Auto,
            0x01 => DriveMode::Heater,
            0x02 => DriveMode::Dehum,
            0x03 => DriveMode::Cooler,
            0x07 => DriveMode::Fan,
            0x1b => DriveMode::AutoCooler,
            0x19 => DriveMode::AutoHeater,
            _ => DriveMode::Fan,
        }
    }
}

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FanSpeed {
    #[default]
    Auto = 0,
    #[strum(serialize = "L1")]
    #[serde(rename = "L1")]
    Level1 = 1,
    #[strum(serialize = "L2")]
    #[serde(rename = "L2")]
    Level2 = 2,
    #[strum(serialize = "L3")]
    #[serde(rename = "L3")]
    Level3 = 3,
    // There is no level at 4
    #[strum(serialize = "L4")]
    #[serde(rename = "L4")]
    Level4 = 5,
    Full = 6,
}

impl From<u8> for FanSpeed {
    fn from(value: u8) -> Self {
        match value {
            1 => FanSpeed::Level1,
            2 => FanSpeed::Level2,
            3 => FanSpeed::Level3,
            5 => FanSpeed::Level4,
            6 => FanSpeed::Full,
            _ => FanSpeed::Auto,
        }
    }
}

#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerticalVane {
    #[default]
    Auto = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    Swing = 7,
}

impl From<u8> for VerticalVane {
    fn from(value: u8) -> Self {
        match value {
            1 => VerticalVane::V1,
            2 => VerticalVane::V2,
            3 => VerticalVane::V3,
            4 => VerticalVane::V4,
            5 => VerticalVane::V5,
            7 => VerticalVane::Swing,
            _ => VerticalVane::Auto,
        }
    }
}

/// Left/right airflow direction, as seen facing the unit.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HorizontalVane {
    #[default]
    Auto = 0,
    L = 1,
    Ls = 2,
    C = 3,
    Rs = 4,
    R = 5,
    Lc = 6,
    Cr = 7,
    Lr = 8,
    Lcr = 9,
    #[strum(serialize = "LCR_S")]
    #[serde(rename = "LCR_S")]
    LcrSwing = 12,
}

impl From<u8> for HorizontalVane {
    fn from(value: u8) -> Self {
        // The top bit flags a wide vane adjustment and is not part of the direction
        match value & 0x7f {
            1 => HorizontalVane::L,
            2 => HorizontalVane::Ls,
            3 => HorizontalVane::C,
            4 => HorizontalVane::Rs,
            5 => HorizontalVane::R,
            6 => HorizontalVane::Lc,
            7 => HorizontalVane::Cr,
            8 => HorizontalVane::Lr,
            9 => HorizontalVane::Lcr,
            12 => HorizontalVane::LcrSwing,
            _ => HorizontalVane::Auto,
        }
    }
}

/// Which of the unit's own remote control functions are disabled.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, AsRefStr, EnumString, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteLock {
    #[default]
    Unlocked = 0,
    PowerLocked = 1,
    ModeLocked = 2,
    TemperatureLocked = 4,
}

/// Whether the unit regulates on its own sensor or on a temperature pushed to it.
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    AsRefStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteTemperatureMode {
    #[default]
    UseInternal = 0,
    RemoteTemp = 1,
}
