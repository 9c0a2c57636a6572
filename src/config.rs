//! # Configuration Management
//!
//! Wire constants and runtime configuration for the protocol engine.
//!
//! The constants at the top of this module describe the network's fixed wire
//! format and well-known addresses. [`NetworkConfig`] carries the tunable
//! parts: which peer to talk to, how often to poll for tick information, how
//! large the receive ring buffer is, and how logging is set up.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment variable overrides via `from_env()`

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default TCP port of a network node
pub const DEFAULT_PORT: u16 = 21841;

/// Size of the request/response header on every package
pub const HEADER_SIZE: usize = 8;

/// Largest package size expressible in the 24-bit header size field
pub const MAX_PACKAGE_SIZE: usize = 0x00FF_FFFF;

/// Default receive ring buffer capacity (4 MiB)
pub const DEFAULT_FRAMER_CAPACITY: usize = 4 * 1024 * 1024;

pub const SIGNATURE_LENGTH: usize = 64;
pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const PRIVATE_KEY_LENGTH: usize = 32;
pub const DIGEST_LENGTH: usize = 32;
pub const CHECKSUM_LENGTH: usize = 3;

/// Seeds are 55 lowercase latin letters
pub const SEED_LENGTH: usize = 55;

/// Identities are 60 uppercase latin letters
pub const IDENTITY_LENGTH: usize = 60;

/// Maximum transaction payload size
pub const MAX_TRANSACTION_SIZE: usize = 1024;

/// Transaction size without payload: keys, amount, tick, input type/size, signature
pub const TRANSACTION_BASE_SIZE: usize = 144;

pub const SPECTRUM_DEPTH: usize = 24;
pub const NUMBER_OF_TRANSACTIONS_PER_TICK: usize = 1024;
pub const MAX_NUMBER_OF_CONTRACTS: usize = 1024;
pub const NUMBER_OF_COMPUTORS: usize = 676;

/// Governance proposal/ballot body size (without header)
pub const SET_PROPOSAL_AND_BALLOT_REQUEST_SIZE: usize = 592;

pub const EMPTY_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const QX_ADDRESS: &str = "BAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAARMID";
pub const QUTIL_ADDRESS: &str = "EAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAVWRF";
pub const ARBITRATOR: &str = "AFZPUAIYVPNUYGJRQVLUKOPPVLHAZQTGLYAAUUNBXFTVTAMSBKQBLEIEPCVJ";

/// QX fee for transferring asset shares (in qubic)
pub const QX_TRANSFER_ASSET_FEE: i64 = 100;
/// QX fee for issuing a new asset (in qubic)
pub const QX_ISSUE_ASSET_FEE: i64 = 1_000_000_000;
pub const QX_ISSUE_ASSET_INPUT_TYPE: u16 = 1;
pub const QX_TRANSFER_ASSET_INPUT_TYPE: u16 = 2;
pub const QX_ADD_ASK_ORDER: u16 = 5;
pub const QX_ADD_BID_ORDER: u16 = 6;
pub const QX_REMOVE_ASK_ORDER: u16 = 7;
pub const QX_REMOVE_BID_ORDER: u16 = 8;

pub const QUTIL_SENDMANY_INPUT_TYPE: u16 = 1;
/// QUtil fee for a send-many transaction (in qubic)
pub const QUTIL_SENDMANY_FEE: i64 = 10;

/// Input type of a contract IPO bid transaction
pub const CONTRACT_IPO_BID_INPUT_TYPE: u16 = 1;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetworkConfig {
    /// Peer connection configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Stream framing configuration
    #[serde(default)]
    pub framer: FramerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("QUBIC_PEER_HOST") {
            config.client.host = host;
        }

        if let Ok(port) = std::env::var("QUBIC_PEER_PORT") {
            config.client.port = port
                .parse::<u16>()
                .map_err(|e| ProtocolError::ConfigError(format!("Invalid QUBIC_PEER_PORT: {e}")))?;
        }

        if let Ok(timeout) = std::env::var("QUBIC_CONNECTION_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.client.connection_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(interval) = std::env::var("QUBIC_TICK_POLL_INTERVAL_MS") {
            if let Ok(val) = interval.parse::<u64>() {
                config.client.tick_poll_interval = Duration::from_millis(val);
            }
        }

        if let Ok(capacity) = std::env::var("QUBIC_FRAMER_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.framer.buffer_capacity = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.client.validate());
        errors.extend(self.framer.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Peer connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Peer host name or IP address
    pub host: String,

    /// Peer TCP port
    pub port: u16,

    /// Timeout for connection attempts
    #[serde(with = "duration_serde")]
    pub connection_timeout: Duration,

    /// Timeout for a single outbound write
    #[serde(with = "duration_serde")]
    pub write_timeout: Duration,

    /// Interval of the current-tick-info poll
    #[serde(with = "duration_serde")]
    pub tick_poll_interval: Duration,

    /// Size of a single socket read
    pub read_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
            connection_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(3),
            tick_poll_interval: Duration::from_millis(500),
            read_chunk_size: 64 * 1024,
        }
    }
}

impl ClientConfig {
    /// `host:port` of the configured peer
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate client configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.is_empty() {
            errors.push("Peer host cannot be empty".to_string());
        }

        if self.port == 0 {
            errors.push("Peer port must be greater than 0".to_string());
        }

        if self.connection_timeout.as_millis() < 100 {
            errors.push("Connection timeout too short (minimum: 100ms)".to_string());
        } else if self.connection_timeout.as_secs() > 300 {
            errors.push("Connection timeout too long (maximum: 300s)".to_string());
        }

        if self.write_timeout.as_millis() < 10 {
            errors.push("Write timeout too short (minimum: 10ms)".to_string());
        }

        if self.tick_poll_interval.as_millis() < 50 {
            errors.push("Tick poll interval too short (minimum: 50ms)".to_string());
        } else if self.tick_poll_interval.as_secs() > 3600 {
            errors.push("Tick poll interval too long (maximum: 1 hour)".to_string());
        }

        if self.read_chunk_size == 0 {
            errors.push("Read chunk size must be greater than 0".to_string());
        }

        errors
    }
}

/// Stream framing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FramerConfig {
    /// Capacity of the receive ring buffer in bytes
    pub buffer_capacity: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_FRAMER_CAPACITY,
        }
    }
}

impl FramerConfig {
    /// Validate framer configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.buffer_capacity < HEADER_SIZE {
            errors.push(format!(
                "Framer buffer capacity too small: {} bytes (minimum: {HEADER_SIZE})",
                self.buffer_capacity
            ));
        } else if self.buffer_capacity > 256 * 1024 * 1024 {
            errors.push(format!(
                "Framer buffer capacity too large: {} bytes (maximum recommended: 256 MB)",
                self.buffer_capacity
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("qubic-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
