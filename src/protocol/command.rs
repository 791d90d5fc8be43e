//! Command frames sent to the unit.
//!
//! Every command starts with `fc 41 01 30 10` and a command kind, and is padded
//! to the checksum window before the checksum byte:
//!
//! ```text
//! kind  family
//! 0x01  general control: power, mode, setpoint, fan, vanes, remote lock
//! 0x07  remote temperature
//! 0x08  extend08: dehumidifier, power saving, buzzer, wind break
//! ```

use std::fmt;

use bitfield::bitfield;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use super::{
    frame::{self, CHECKSUM_WINDOW, HEADER, MARKER},
    temperature, DriveMode, FanSpeed, GeneralState, HorizontalVane, PowerState, RemoteLock,
    RemoteTemperatureMode, VerticalVane,
};

/// Group code of frames going to the unit
const COMMAND_GROUP: u8 = 0x41;

const KIND_GENERAL: u8 = 0x01;
const KIND_REMOTE_TEMPERATURE: u8 = 0x07;
const KIND_EXTEND08: u8 = 0x08;

/// Last general segment. 0x41 asks the unit to regulate on its own sensor.
const CHECK_INSIDE: u8 = 0x41;
/// Written in the extend08 frame whenever power saving is on
const POWER_SAVING_MARKER: u8 = 0x0a;

bitfield! {
    /// Which fields of a general-control frame the unit should apply.
    ///
    /// The low byte goes out as the first flag segment, the high byte as the second.
    pub struct GeneralControls(u16);
    impl Debug;
    pub power, set_power: 0;
    pub drive_mode, set_drive_mode: 1;
    pub temperature, set_temperature: 2;
    pub fan_speed, set_fan_speed: 3;
    pub vertical_vane, set_vertical_vane: 4;
    pub remote_lock, set_remote_lock: 6;
    pub horizontal_vane, set_horizontal_vane: 8;
    pub outside_control, set_outside_control: 9;
    pub u8, flags_a, _: 7, 0;
    pub u8, flags_b, _: 15, 8;
}

impl Clone for GeneralControls {
    fn clone(&self) -> Self {
        GeneralControls(self.0)
    }
}

impl Copy for GeneralControls {}

impl Default for GeneralControls {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralControls {
    /// Nothing dirty. The outside-control bit is on, as every known client sends it.
    pub fn new() -> Self {
        let mut controls = GeneralControls(0);
        controls.set_outside_control(true);
        controls
    }

    /// Whether any field is marked for the unit to apply.
    pub fn is_dirty(&self) -> bool {
        self.flags_a() != 0 || self.horizontal_vane()
    }
}

bitfield! {
    /// Which features an extend08 frame changes.
    pub struct Extend08Controls(u8);
    impl Debug;
    pub dehumidifier, set_dehumidifier: 2;
    pub power_saving, set_power_saving: 3;
    pub buzzer, set_buzzer: 4;
    pub wind_break, set_wind_break: 5;
}

impl Clone for Extend08Controls {
    fn clone(&self) -> Self {
        Extend08Controls(self.0)
    }
}

impl Copy for Extend08Controls {}

impl Default for Extend08Controls {
    fn default() -> Self {
        Extend08Controls(0)
    }
}

impl Extend08Controls {
    pub fn is_dirty(&self) -> bool {
        self.0 != 0
    }
}

/// A checksummed frame, ready to be hex encoded and handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame(Bytes);

impl CommandFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Changes a controller wants made, relative to the last known state.
///
/// A field left at `None` is neither changed nor marked dirty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralOverrides {
    pub power: Option<PowerState>,
    pub drive_mode: Option<DriveMode>,
    /// Tenths of a degree
    pub temperature_tenths: Option<i16>,
    pub fan_speed: Option<FanSpeed>,
    pub vertical_vane: Option<VerticalVane>,
    pub horizontal_vane: Option<HorizontalVane>,
    pub remote_lock: Option<RemoteLock>,

    pub dehumidifier_level: Option<u8>,
    pub power_saving: Option<bool>,
    pub wind_break: Option<u8>,
    /// Beep on receipt
    pub buzzer: bool,
}

impl GeneralOverrides {
    /// The state the unit should end up in.
    pub fn apply(&self, baseline: &GeneralState) -> GeneralState {
        let mut state = baseline.clone();
        if let Some(power) = self.power {
            state.power = power;
        }
        if let Some(mode) = self.drive_mode {
            state.set_drive_mode(mode);
        }
        if let Some(tenths) = self.temperature_tenths {
            state.temperature_tenths = tenths;
            // Half degrees only survive in the fine encoding
            if tenths % 10 != 0 {
                state.fine_temperature = true;
            }
        }
        if let Some(speed) = self.fan_speed {
            state.fan_speed = speed;
        }
        if let Some(vane) = self.vertical_vane {
            state.vertical_vane = vane;
        }
        if let Some(vane) = self.horizontal_vane {
            state.horizontal_vane = vane;
        }
        if let Some(level) = self.dehumidifier_level {
            state.dehumidifier_level = level;
        }
        if let Some(on) = self.power_saving {
            state.power_saving = on;
        }
        if let Some(direction) = self.wind_break {
            state.wind_break = direction;
        }
        state
    }

    pub fn general_controls(&self) -> GeneralControls {
        let mut controls = GeneralControls::new();
        controls.set_power(self.power.is_some());
        controls.set_drive_mode(self.drive_mode.is_some());
        controls.set_temperature(self.temperature_tenths.is_some());
        controls.set_fan_speed(self.fan_speed.is_some());
        controls.set_vertical_vane(self.vertical_vane.is_some());
        controls.set_remote_lock(self.remote_lock.is_some());
        controls.set_horizontal_vane(self.horizontal_vane.is_some());
        controls
    }

    pub fn extend08_controls(&self) -> Extend08Controls {
        let mut controls = Extend08Controls::default();
        controls.set_dehumidifier(self.dehumidifier_level.is_some());
        controls.set_power_saving(self.power_saving.is_some());
        controls.set_buzzer(self.buzzer);
        controls.set_wind_break(self.wind_break.is_some());
        controls
    }
}

/// Result of [`CommandEncoder::encode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCommand {
    /// State the unit is expected to report once the frames are applied.
    /// Only a guess until the unit's next status response confirms it.
    pub state: GeneralState,
    /// In the order they must be sent
    pub frames: Vec<CommandFrame>,
}

pub struct CommandEncoder;

impl CommandEncoder {
    /// General-control frame for `state`. Only fields marked in `controls` carry
    /// their value, the others are zeroed. The setpoint is always written in
    /// both encodings.
    pub fn general(state: &GeneralState, controls: GeneralControls) -> CommandFrame {
        Self::general_with_lock(state, controls, RemoteLock::Unlocked)
    }

    pub fn general_with_lock(
        state: &GeneralState,
        controls: GeneralControls,
        lock: RemoteLock,
    ) -> CommandFrame {
        let value = |dirty: bool, byte: u8| if dirty { byte } else { 0 };

        let mut buf = command_header(KIND_GENERAL);
        buf.put_u8(controls.flags_a());
        buf.put_u8(controls.flags_b());
        buf.put_u8(value(controls.power(), state.power as u8));
        buf.put_u8(value(controls.drive_mode(), state.drive_mode as u8));
        buf.put_u8(temperature::coarse_segment(state.temperature_tenths));
        buf.put_u8(value(controls.fan_speed(), state.fan_speed as u8));
        buf.put_u8(value(controls.vertical_vane(), state.vertical_vane as u8));
        buf.put_bytes(0, 3);
        buf.put_u8(value(controls.remote_lock(), lock as u8));
        buf.put_u8(0);
        buf.put_u8(value(controls.horizontal_vane(), state.horizontal_vane as u8));
        buf.put_u8(temperature::fine_segment(state.temperature_tenths));
        buf.put_u8(CHECK_INSIDE);

        finish(buf)
    }

    /// Locks or unlocks the unit's own remote without touching anything else.
    pub fn remote_lock(state: &GeneralState, lock: RemoteLock) -> CommandFrame {
        let mut controls = GeneralControls::new();
        controls.set_remote_lock(true);
        Self::general_with_lock(state, controls, lock)
    }

    /// Extend08 frame for `state`. Dehumidifier level and wind break direction
    /// are only written when marked, the power saving marker whenever power
    /// saving is on.
    pub fn extend08(state: &GeneralState, controls: Extend08Controls) -> CommandFrame {
        let mut buf = command_header(KIND_EXTEND08);
        buf.put_u8(controls.0);
        buf.put_bytes(0, 2);
        buf.put_u8(if controls.dehumidifier() {
            state.dehumidifier_level
        } else {
            0
        });
        buf.put_u8(if state.power_saving {
            POWER_SAVING_MARKER
        } else {
            0
        });
        buf.put_u8(if controls.wind_break() {
            state.wind_break
        } else {
            0
        });
        buf.put_u8(controls.buzzer() as u8);

        finish(buf)
    }

    /// Tells the unit which temperature to regulate on. With
    /// [`RemoteTemperatureMode::UseInternal`] the value is carried but ignored.
    pub fn remote_temperature(mode: RemoteTemperatureMode, tenths: i16) -> CommandFrame {
        let mut buf = command_header(KIND_REMOTE_TEMPERATURE);
        buf.put_u8(mode as u8);
        buf.put_u8(temperature::remote_coarse_segment(tenths));
        buf.put_u8(temperature::fine_segment(tenths));

        finish(buf)
    }

    /// Applies `overrides` to `baseline` and builds whatever frames that takes:
    /// a general frame if a general field changed, then an extend08 frame if
    /// one of its features did.
    pub fn encode(baseline: &GeneralState, overrides: &GeneralOverrides) -> EncodedCommand {
        let state = overrides.apply(baseline);
        let general = overrides.general_controls();
        let extend08 = overrides.extend08_controls();

        let mut frames = Vec::with_capacity(2);
        if general.is_dirty() {
            let lock = overrides.remote_lock.unwrap_or_default();
            frames.push(Self::general_with_lock(&state, general, lock));
        }
        if extend08.is_dirty() {
            frames.push(Self::extend08(&state, extend08));
        }

        for frame in &frames {
            debug!("Encoded command: {frame}");
        }
        EncodedCommand { state, frames }
    }
}

fn command_header(kind: u8) -> BytesMut {
    let mut buf = BytesMut::with_capacity(CHECKSUM_WINDOW + 2);
    buf.put_u8(MARKER);
    buf.put_u8(COMMAND_GROUP);
    buf.put_slice(&HEADER);
    buf.put_u8(kind);
    buf
}

/// Zero pads to the checksum window and appends the checksum.
fn finish(mut buf: BytesMut) -> CommandFrame {
    if buf.len() < CHECKSUM_WINDOW + 1 {
        buf.resize(CHECKSUM_WINDOW + 1, 0);
    }
    CommandFrame(frame::seal(buf))
}
