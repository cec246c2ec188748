//! Session configuration.
//!
//! Values are layered: built-in defaults, then the `[dvb]` section of a TOML
//! file, then `DVBTUNE_*` environment variables, then command-line flags
//! (applied by the binary).

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::tuner::{FilterMode, ToneMode};

/// Default file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "dvbtune.toml";

const ENV_PREFIX: &str = "DVBTUNE_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DvbConfig {
    pub adapter: u8,
    pub device: u8,
    /// Capture the whole transport stream; PID requests are ignored.
    pub budget: bool,
    /// Extend one demultiplexer filter instead of opening one per PID.
    pub shared_filter: bool,
    pub high_voltage: bool,
    /// 22 kHz tone: 0 off, 1 on, -1 automatic.
    pub tone: i32,
    /// DiSEqC satellite number, 0 for none.
    pub satno: u32,
    /// Demultiplexer buffer in bytes.
    pub buffer_size: u32,
    pub read_timeout_ms: u64,
}

impl Default for DvbConfig {
    fn default() -> Self {
        Self {
            adapter: 0,
            device: 0,
            budget: false,
            shared_filter: false,
            high_voltage: false,
            tone: -1,
            satno: 0,
            buffer_size: 1 << 20,
            read_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    dvb: DvbConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parses the `[dvb]` section of a TOML document. Missing keys keep their
/// defaults.
pub fn from_toml(contents: &str) -> Result<DvbConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(contents)?;
    Ok(file.dvb)
}

pub fn load_config(path: &Path) -> Result<DvbConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_toml(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("configuration loaded from {}: {:?}", path.display(), config);
    Ok(config)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn set_parsed<T: std::str::FromStr>(key: &str, value: &str, slot: &mut T) {
    match value.trim().parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!("ignoring {}{}: invalid value {:?}", ENV_PREFIX, key, value),
    }
}

fn set_bool(key: &str, value: &str, slot: &mut bool) {
    match parse_bool(value.trim()) {
        Some(v) => *slot = v,
        None => warn!("ignoring {}{}: invalid value {:?}", ENV_PREFIX, key, value),
    }
}

impl DvbConfig {
    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(std::env::vars());
    }

    /// Overrides fields from `DVBTUNE_*` variables. Unknown variables are
    /// ignored, unparsable values are logged and ignored.
    pub fn apply_vars<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(key) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match key {
                "ADAPTER" => set_parsed(key, value, &mut self.adapter),
                "DEVICE" => set_parsed(key, value, &mut self.device),
                "BUDGET" => set_bool(key, value, &mut self.budget),
                "SHARED_FILTER" => set_bool(key, value, &mut self.shared_filter),
                "HIGH_VOLTAGE" => set_bool(key, value, &mut self.high_voltage),
                "TONE" => set_parsed(key, value, &mut self.tone),
                "SATNO" => set_parsed(key, value, &mut self.satno),
                _ => {}
            }
        }
    }

    pub fn filter_mode(&self) -> FilterMode {
        if self.budget {
            FilterMode::Budget
        } else if self.shared_filter {
            FilterMode::SharedFilter
        } else {
            FilterMode::PerPid
        }
    }

    pub fn tone_mode(&self) -> ToneMode {
        ToneMode::from_config(self.tone)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DvbConfig::default();
        assert_eq!(config.filter_mode(), FilterMode::PerPid);
        assert_eq!(config.tone_mode(), ToneMode::Auto);
        assert_eq!(config.read_timeout(), Duration::from_millis(500));
        assert_eq!(config.buffer_size, 1 << 20);
    }

    #[test]
    fn test_from_toml() {
        let content = r#"
[dvb]
adapter = 2
budget = true
tone = 1
satno = 3

[other]
key = "value"
"#;
        let config = from_toml(content).unwrap();
        assert_eq!(config.adapter, 2);
        assert_eq!(config.device, 0);
        assert_eq!(config.filter_mode(), FilterMode::Budget);
        assert_eq!(config.tone_mode(), ToneMode::On);
        assert_eq!(config.satno, 3);

        assert_eq!(from_toml("").unwrap(), DvbConfig::default());
        assert!(from_toml("[dvb]\nadapter = 300").is_err());
    }

    #[test]
    fn test_apply_vars() {
        let mut config = DvbConfig::default();
        config.apply_vars([
            ("DVBTUNE_ADAPTER", "1"),
            ("DVBTUNE_DEVICE", " 2 "),
            ("DVBTUNE_SHARED_FILTER", "Yes"),
            ("DVBTUNE_HIGH_VOLTAGE", "on"),
            ("DVBTUNE_TONE", "0"),
            ("DVBTUNE_SATNO", "4"),
            ("HOME", "/root"),
        ]);
        assert_eq!(config.adapter, 1);
        assert_eq!(config.device, 2);
        assert_eq!(config.filter_mode(), FilterMode::SharedFilter);
        assert!(config.high_voltage);
        assert_eq!(config.tone_mode(), ToneMode::Off);
        assert_eq!(config.satno, 4);
    }

    #[test]
    fn test_invalid_vars_are_ignored() {
        let mut config = DvbConfig {
            adapter: 3,
            ..DvbConfig::default()
        };
        config.apply_vars([
            ("DVBTUNE_ADAPTER", "many"),
            ("DVBTUNE_BUDGET", "maybe"),
            ("DVBTUNE_SATNO", "-1"),
        ]);
        assert_eq!(config.adapter, 3);
        assert!(!config.budget);
        assert_eq!(config.satno, 0);
    }

    #[test]
    fn test_budget_wins_over_shared_filter() {
        let config = DvbConfig {
            budget: true,
            shared_filter: true,
            ..DvbConfig::default()
        };
        assert_eq!(config.filter_mode(), FilterMode::Budget);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/dvbtune.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
