use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use hexplay::HexViewBuilder;
use serde_json::{json, Value};
use tracing::info;

use mitsubishi_wifi::{
    config::Config,
    lines::Lines,
    logging::{init_logging, LogFormat},
    protocol::{
        frame::FrameValidator, AggregatedState, CommandEncoder, DriveMode, FanSpeed, FrameKind,
        GeneralOverrides, GeneralState, HorizontalVane, PowerState, RemoteLock,
        RemoteTemperatureMode, SensorLayout, VerticalVane,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode and build frames for Mitsubishi WiFi adapters")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (stderr), overrides the config file
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// More logging, repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fold hex frames from stdin, one per line, into a device state printed as JSON
    Decode {
        /// How to read the secondary region of sensor frames, overrides the config file
        #[arg(long)]
        sensor_layout: Option<SensorLayout>,
        #[arg(long, default_value = "")]
        mac: String,
        #[arg(long, default_value = "")]
        serial: String,
    },

    /// Dump each hex frame from stdin with its kind and validation result
    Inspect,

    /// Print the command frames that apply the given changes
    Encode(EncodeArgs),

    /// Print a frame telling the unit which temperature to regulate on
    RemoteTemperature {
        /// Degrees Celsius
        temperature: f32,
        #[arg(long, default_value = "remote-temp")]
        mode: RemoteTemperatureMode,
    },
}

#[derive(Args, Debug, Default)]
struct EncodeArgs {
    /// Last general status frame, hex. Defaults to a unit that is off, in AUTO at 22 degrees
    #[arg(long)]
    baseline: Option<String>,

    #[arg(long)]
    power: Option<PowerState>,
    #[arg(long)]
    mode: Option<DriveMode>,
    /// Degrees Celsius, in steps of 0.5
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(long)]
    fan: Option<FanSpeed>,
    #[arg(long)]
    vertical_vane: Option<VerticalVane>,
    #[arg(long)]
    horizontal_vane: Option<HorizontalVane>,
    #[arg(long)]
    remote_lock: Option<RemoteLock>,

    /// Level, 0-100
    #[arg(long)]
    dehumidifier: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    power_saving: Option<bool>,
    /// Raw wind and wind break direction
    #[arg(long)]
    wind_break: Option<u8>,
    /// Beep when the unit applies the change
    #[arg(long)]
    buzzer: bool,
}

impl EncodeArgs {
    fn overrides(&self) -> GeneralOverrides {
        GeneralOverrides {
            power: self.power,
            drive_mode: self.mode,
            temperature_tenths: self.temperature.map(to_tenths),
            fan_speed: self.fan,
            vertical_vane: self.vertical_vane,
            horizontal_vane: self.horizontal_vane,
            remote_lock: self.remote_lock,
            dehumidifier_level: self.dehumidifier,
            power_saving: self.power_saving,
            wind_break: self.wind_break,
            buzzer: self.buzzer,
        }
    }

    fn baseline(&self) -> Result<GeneralState> {
        match &self.baseline {
            Some(code) => {
                let frame = hex::decode(code.trim()).context("baseline is not valid hex")?;
                Ok(GeneralState::decode(&frame)?)
            }
            None => Ok(GeneralState::default()),
        }
    }
}

fn to_tenths(degrees: f32) -> i16 {
    (degrees * 10.0).round() as i16
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(cli.log_format.unwrap_or(config.log_format), cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Decode {
            sensor_layout,
            mac,
            serial,
        } => {
            let frames = Lines::new(io::stdin()).collect_frames()?;
            let state = AggregatedState::build(&frames).with_identity(mac, serial);
            let report = report(&state, sensor_layout.unwrap_or(config.sensor_layout))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Command::Inspect => {
            for frame in Lines::new(io::stdin()) {
                inspect(&mut out, &frame?)?;
            }
        }
        Command::Encode(args) => {
            let encoded = CommandEncoder::encode(&args.baseline()?, &args.overrides());
            if encoded.frames.is_empty() {
                info!("Nothing to change");
            }
            for frame in &encoded.frames {
                writeln!(out, "{frame}")?;
            }
            info!("Expected state: {}", hex::encode(encoded.state.to_frame()));
        }
        Command::RemoteTemperature { temperature, mode } => {
            let frame = CommandEncoder::remote_temperature(mode, to_tenths(temperature));
            writeln!(out, "{frame}")?;
        }
    }

    out.flush()?;
    Ok(())
}

/// JSON view of a device state, with the sensor layout applied and rejected frames listed.
fn report(state: &AggregatedState, layout: SensorLayout) -> Result<Value> {
    let mut value = serde_json::to_value(state)?;
    if let Some(general) = &state.general {
        value["general"]["temperature"] = json!(general.temperature());
    }
    if let Some(sensors) = &state.sensors {
        value["sensors"]["secondary"] = serde_json::to_value(sensors.secondary(layout))?;
    }
    value["rejected"] = Value::Array(
        state
            .rejected
            .iter()
            .map(|r| json!({ "index": r.index, "error": r.error.to_string() }))
            .collect(),
    );
    Ok(value)
}

fn inspect(out: &mut impl Write, frame: &[u8]) -> Result<()> {
    let view = HexViewBuilder::new(frame).row_width(16).finish();
    writeln!(out, "{view}")?;

    match FrameKind::of(frame) {
        Some(kind) => {
            let result = FrameValidator::validate(frame, kind.min_len())
                .map(|mismatches| mismatches.iter().map(|m| m.to_string()).collect::<Vec<_>>());
            match result {
                Ok(mismatches) if mismatches.is_empty() => writeln!(out, "{}: ok", kind.as_ref())?,
                Ok(mismatches) => {
                    writeln!(out, "{}: ok, {}", kind.as_ref(), mismatches.join("; "))?
                }
                Err(e) => writeln!(out, "{}: {e}", kind.as_ref())?,
            }
        }
        None => match frame.get(5).map(|&d| FrameKind::try_from(d)) {
            Some(Err(e)) => writeln!(out, "{e}")?,
            _ => writeln!(out, "unrecognized")?,
        },
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from([
            "mitsubishi-wifi",
            "encode",
            "--power",
            "on",
            "--mode",
            "cooler",
            "--temperature",
            "24.5",
            "--fan",
            "L2",
            "--power-saving",
            "true",
        ])
        .unwrap();

        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.power, Some(PowerState::On));
        assert_eq!(overrides.drive_mode, Some(DriveMode::Cooler));
        assert_eq!(overrides.temperature_tenths, Some(245));
        assert_eq!(overrides.fan_speed, Some(FanSpeed::Level2));
        assert_eq!(overrides.power_saving, Some(true));
        assert!(!overrides.buzzer);
        assert_eq!(args.baseline().unwrap(), GeneralState::default());
    }

    #[test]
    fn test_parse_globals() {
        let cli = Cli::try_parse_from([
            "mitsubishi-wifi",
            "remote-temperature",
            "21",
            "--mode",
            "use-internal",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(
            cli.command,
            Command::RemoteTemperature {
                mode: RemoteTemperatureMode::UseInternal,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_baseline() {
        let args = EncodeArgs {
            baseline: Some("fc6201301004000000800000000000000000000000d9".into()),
            ..Default::default()
        };
        assert!(args.baseline().is_err());
    }

    #[test]
    fn test_report() {
        let state = AggregatedState::build([
            hex!("fc620130100300000c00a5acad0000000123450000e7"),
            hex!("fc6201301003000000000000000000000000000000ff"),
        ]);
        let value = report(&state, SensorLayout::ThermalFlags).unwrap();
        assert_eq!(value["rejected"][0]["index"], 1);
        assert!(value["sensors"]["secondary"].is_object());
    }

    #[test]
    fn test_inspect() {
        let mut out = Vec::new();
        inspect(&mut out, &hex!("fc6201301004000000800000000000000000000000d9")).unwrap();
        inspect(&mut out, &hex!("fc6201301007")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: ok"));
        assert!(text.contains("unrecognized"));
    }
}
