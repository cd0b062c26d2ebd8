//! Declarative configuration loading from YAML, TOML, and environment variables.
//!
//! File-based configuration is deserialized into mirror structs and then
//! converted into the programmatic [`ClientConfig`](crate::config::ClientConfig)
//! through the builder API, so the same validation applies.
//!
//! # Example YAML
//!
//! ```yaml
//! instance-name: orders-service
//! network:
//!   addresses:
//!     - "10.0.0.1:5701"
//!     - "10.0.0.2"
//!   connection-attempt-limit: 0
//!   connection-attempt-period-ms: 3000
//!   shuffle-member-list: false
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, ClientConfigBuilder, ConfigError};

/// Port appended to configured addresses that omit one.
const DEFAULT_MEMBER_PORT: u16 = 5701;

/// Top-level file-based configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    /// Client instance name.
    pub instance_name: Option<String>,
    /// Network configuration.
    pub network: Option<FileNetworkConfig>,
}

/// File-based network configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileNetworkConfig {
    /// Cluster member addresses, `host:port` or bare host.
    pub addresses: Option<Vec<String>>,
    /// Number of connection cycles; zero means unbounded.
    pub connection_attempt_limit: Option<u32>,
    /// Minimum spacing between connection cycles in milliseconds.
    pub connection_attempt_period_ms: Option<u64>,
    /// Whether candidate addresses are shuffled.
    pub shuffle_member_list: Option<bool>,
}

/// Parses `host:port` or a bare host. Host names are resolved and the first
/// resolved address is used.
fn parse_address(raw: &str) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    if let Ok(address) = raw.parse::<SocketAddr>() {
        return Ok(address);
    }
    raw.to_socket_addrs()
        .or_else(|_| (raw, DEFAULT_MEMBER_PORT).to_socket_addrs())
        .ok()
        .and_then(|mut resolved| resolved.next())
        .ok_or_else(|| ConfigError::new(format!("invalid member address: {raw}")))
}

impl TryFrom<FileConfig> for ClientConfig {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        let mut builder = ClientConfigBuilder::new();

        if let Some(name) = file.instance_name {
            builder = builder.instance_name(name);
        }

        if let Some(net) = file.network {
            if let Some(raw) = net.addresses {
                let addresses = raw
                    .iter()
                    .map(|a| parse_address(a))
                    .collect::<Result<Vec<_>, _>>()?;
                builder = builder.addresses(addresses);
            }

            builder = builder.network(|mut n| {
                if let Some(limit) = net.connection_attempt_limit {
                    n = n.connection_attempt_limit(limit);
                }
                if let Some(ms) = net.connection_attempt_period_ms {
                    n = n.connection_attempt_period(Duration::from_millis(ms));
                }
                if let Some(shuffle) = net.shuffle_member_list {
                    n = n.shuffle_member_list(shuffle);
                }
                n
            });
        }

        builder.build()
    }
}

impl ClientConfig {
    /// Loads configuration from a YAML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_yaml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read YAML config file: {e}")))?;
        let file_config: FileConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse YAML config: {e}")))?;
        file_config.try_into()
    }

    /// Loads configuration from a TOML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read TOML config file: {e}")))?;
        let file_config: FileConfig = toml_crate::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse TOML config: {e}")))?;
        file_config.try_into()
    }

    /// Loads configuration from environment variables.
    ///
    /// | Variable | Maps to |
    /// |----------|---------|
    /// | `HZ_INSTANCE_NAME` | `instance_name` |
    /// | `HZ_ADDRESSES` | Comma-separated member addresses |
    /// | `HZ_CONNECTION_ATTEMPT_LIMIT` | Connection cycles, `0` = unbounded |
    /// | `HZ_CONNECTION_ATTEMPT_PERIOD_MS` | Cycle spacing in milliseconds |
    /// | `HZ_SHUFFLE_MEMBER_LIST` | `"true"` or `"false"` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file_config = FileConfig::default();

        if let Some(val) = lookup("HZ_INSTANCE_NAME") {
            file_config.instance_name = Some(val);
        }

        if let Some(val) = lookup("HZ_ADDRESSES") {
            file_config.network.get_or_insert_with(Default::default).addresses = Some(
                val.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        if let Some(val) = lookup("HZ_CONNECTION_ATTEMPT_LIMIT") {
            let limit = val.parse::<u32>().map_err(|_| {
                ConfigError::new(format!("invalid HZ_CONNECTION_ATTEMPT_LIMIT: {val}"))
            })?;
            file_config
                .network
                .get_or_insert_with(Default::default)
                .connection_attempt_limit = Some(limit);
        }

        if let Some(val) = lookup("HZ_CONNECTION_ATTEMPT_PERIOD_MS") {
            let ms = val.parse::<u64>().map_err(|_| {
                ConfigError::new(format!("invalid HZ_CONNECTION_ATTEMPT_PERIOD_MS: {val}"))
            })?;
            file_config
                .network
                .get_or_insert_with(Default::default)
                .connection_attempt_period_ms = Some(ms);
        }

        if let Some(val) = lookup("HZ_SHUFFLE_MEMBER_LIST") {
            let shuffle = val.trim().to_ascii_lowercase().parse::<bool>().map_err(|_| {
                ConfigError::new(format!("invalid HZ_SHUFFLE_MEMBER_LIST: {val}"))
            })?;
            file_config
                .network
                .get_or_insert_with(Default::default)
                .shuffle_member_list = Some(shuffle);
        }

        file_config.try_into()
    }
}

/// Loads a configuration file, picking the format from its extension.
///
/// Supports `.yaml`, `.yml`, and `.toml`. Requires the `config-file` feature.
#[cfg(feature = "config-file")]
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => ClientConfig::from_yaml(path),
        Some("toml") => ClientConfig::from_toml(path),
        Some(ext) => Err(ConfigError::new(format!(
            "unsupported config file extension: .{ext} (expected .yaml, .yml, or .toml)"
        ))),
        None => Err(ConfigError::new(
            "config file has no extension; expected .yaml, .yml, or .toml",
        )),
    }
}
