//! Configuration file support for SRT CLI tools

use serde::{Deserialize, Serialize};
use srt::SocketConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Sender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Input source (file path or "-" for stdin)
    pub input: String,
    /// Remote host
    pub host: String,
    /// Remote port
    pub port: u16,
    /// Socket options, as accepted by `SocketConfig`
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Pacing limit in bits per second; unlimited when absent
    pub bitrate_bps: Option<u64>,
    /// Statistics interval in seconds
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

fn default_stats_interval() -> u64 {
    1
}

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Output destination (file path or "-" for stdout)
    pub output: String,
    /// Bind address, empty for all interfaces
    #[serde(default)]
    pub bind: String,
    /// Listen port
    pub port: u16,
    /// Socket options, as accepted by `SocketConfig`
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Buffer size
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Statistics interval in seconds
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

fn default_buffer_size() -> usize {
    srt::DEFAULT_PACKET_SIZE
}

/// Combined configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sender configuration
    pub sender: Option<SenderConfig>,
    /// Receiver configuration
    pub receiver: Option<ReceiverConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Create example sender configuration
    pub fn example_sender() -> Self {
        Config {
            sender: Some(SenderConfig {
                input: "-".to_string(),
                host: "192.168.1.10".to_string(),
                port: 9000,
                options: BTreeMap::from([
                    ("latency".to_string(), "120".to_string()),
                    ("streamid".to_string(), "live/camera1".to_string()),
                ]),
                bitrate_bps: Some(5_000_000),
                stats_interval_secs: 1,
            }),
            receiver: None,
        }
    }

    /// Create example receiver configuration
    pub fn example_receiver() -> Self {
        Config {
            sender: None,
            receiver: Some(ReceiverConfig {
                output: "-".to_string(),
                bind: String::new(),
                port: 9000,
                options: BTreeMap::from([("latency".to_string(), "120".to_string())]),
                buffer_size: srt::DEFAULT_PACKET_SIZE,
                stats_interval_secs: 1,
            }),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parse a `key=value` socket option from the command line
pub fn parse_option(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::Invalid(format!(
            "expected key=value, got '{}'",
            raw
        ))),
    }
}

/// File options first, command-line overrides last
pub fn socket_config<'a>(
    file: &BTreeMap<String, String>,
    overrides: impl IntoIterator<Item = &'a (String, String)>,
) -> SocketConfig {
    let mut config: SocketConfig = file.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    for (key, value) in overrides {
        config.insert(key.clone(), value.clone());
    }
    config
}

impl SenderConfig {
    /// Get statistics interval as Duration
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

impl ReceiverConfig {
    /// Get statistics interval as Duration
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}
