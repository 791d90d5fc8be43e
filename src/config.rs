use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{logging::LogFormat, protocol::SensorLayout};

/// Settings for the command line tool. The library takes everything it needs
/// as arguments and never reads this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// How to read the secondary region of sensor frames
    pub sensor_layout: SensorLayout,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `path` if given. No path means defaults; a path that can't be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&txt).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(txt: &str) -> Result<Self> {
        Ok(toml::from_str(txt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
        assert_eq!(Config::parse("").unwrap().sensor_layout, SensorLayout::RuntimeCounter);
    }

    #[test]
    fn test_parse() {
        let config = Config::parse(
            r#"
            sensor-layout = "thermal-flags"
            log-format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.sensor_layout, SensorLayout::ThermalFlags);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_unknown() {
        assert!(Config::parse("sensor-layout = \"bogus\"").is_err());
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mitsubishi-wifi.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
