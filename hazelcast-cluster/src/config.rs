//! Client configuration types and builders.

use std::net::SocketAddr;
use std::time::Duration;

/// Default client instance name.
const DEFAULT_INSTANCE_NAME: &str = "hz.client";
/// Default number of connection cycles before giving up.
const DEFAULT_CONNECTION_ATTEMPT_LIMIT: u32 = 2;
/// Default minimum spacing between the starts of two connection cycles.
const DEFAULT_CONNECTION_ATTEMPT_PERIOD: Duration = Duration::from_millis(3000);
/// Candidate addresses are shuffled unless told otherwise.
const DEFAULT_SHUFFLE_MEMBER_LIST: bool = true;

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for hazelcast_core::HazelcastError {
    fn from(err: ConfigError) -> Self {
        hazelcast_core::HazelcastError::Configuration(err.message)
    }
}

/// Network configuration governing how the owner connection is found.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    addresses: Vec<SocketAddr>,
    connection_attempt_limit: u32,
    connection_attempt_period: Duration,
    shuffle_member_list: bool,
}

impl NetworkConfig {
    /// Returns the statically configured cluster member addresses.
    pub fn addresses(&self) -> &[SocketAddr] {
        &self.addresses
    }

    /// Returns the configured number of connection cycles.
    ///
    /// Zero means the client keeps trying until it connects or is shut down.
    pub fn connection_attempt_limit(&self) -> u32 {
        self.connection_attempt_limit
    }

    /// Returns the attempt limit with zero mapped to an effectively
    /// unbounded count.
    pub fn effective_attempt_limit(&self) -> u32 {
        if self.connection_attempt_limit == 0 {
            u32::MAX
        } else {
            self.connection_attempt_limit
        }
    }

    /// Returns the minimum spacing between the starts of two connection cycles.
    pub fn connection_attempt_period(&self) -> Duration {
        self.connection_attempt_period
    }

    /// Returns whether candidate addresses are shuffled before each cycle.
    pub fn shuffle_member_list(&self) -> bool {
        self.shuffle_member_list
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            addresses: vec![default_address()],
            connection_attempt_limit: DEFAULT_CONNECTION_ATTEMPT_LIMIT,
            connection_attempt_period: DEFAULT_CONNECTION_ATTEMPT_PERIOD,
            shuffle_member_list: DEFAULT_SHUFFLE_MEMBER_LIST,
        }
    }
}

/// Member address used when none is configured.
fn default_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5701))
}

/// Builder for `NetworkConfig`.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigBuilder {
    addresses: Vec<SocketAddr>,
    connection_attempt_limit: Option<u32>,
    connection_attempt_period: Option<Duration>,
    shuffle_member_list: Option<bool>,
}

impl NetworkConfigBuilder {
    /// Creates a new network configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cluster member address.
    pub fn add_address(mut self, address: SocketAddr) -> Self {
        self.addresses.push(address);
        self
    }

    /// Sets the cluster member addresses, replacing any previously configured.
    pub fn addresses(mut self, addresses: impl IntoIterator<Item = SocketAddr>) -> Self {
        self.addresses = addresses.into_iter().collect();
        self
    }

    /// Sets how many connection cycles are run before giving up. Zero
    /// means unbounded.
    pub fn connection_attempt_limit(mut self, limit: u32) -> Self {
        self.connection_attempt_limit = Some(limit);
        self
    }

    /// Sets the minimum spacing between the starts of two connection cycles.
    pub fn connection_attempt_period(mut self, period: Duration) -> Self {
        self.connection_attempt_period = Some(period);
        self
    }

    /// Enables or disables shuffling of candidate addresses.
    pub fn shuffle_member_list(mut self, shuffle: bool) -> Self {
        self.shuffle_member_list = Some(shuffle);
        self
    }

    /// Builds the network configuration.
    pub fn build(self) -> Result<NetworkConfig, ConfigError> {
        let addresses = if self.addresses.is_empty() {
            vec![default_address()]
        } else {
            self.addresses
        };

        Ok(NetworkConfig {
            addresses,
            connection_attempt_limit: self
                .connection_attempt_limit
                .unwrap_or(DEFAULT_CONNECTION_ATTEMPT_LIMIT),
            connection_attempt_period: self
                .connection_attempt_period
                .unwrap_or(DEFAULT_CONNECTION_ATTEMPT_PERIOD),
            shuffle_member_list: self
                .shuffle_member_list
                .unwrap_or(DEFAULT_SHUFFLE_MEMBER_LIST),
        })
    }
}

/// Main client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    instance_name: String,
    network: NetworkConfig,
}

impl ClientConfig {
    /// Creates a new client configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the client instance name, used to label background tasks.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Returns the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            instance_name: DEFAULT_INSTANCE_NAME.to_string(),
            network: NetworkConfig::default(),
        }
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    instance_name: Option<String>,
    network: NetworkConfigBuilder,
}

impl ClientConfigBuilder {
    /// Creates a new client configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client instance name.
    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    /// Configures network settings using a builder function.
    pub fn network<F>(mut self, f: F) -> Self
    where
        F: FnOnce(NetworkConfigBuilder) -> NetworkConfigBuilder,
    {
        self.network = f(self.network);
        self
    }

    /// Adds a cluster member address.
    pub fn add_address(mut self, address: SocketAddr) -> Self {
        self.network = self.network.add_address(address);
        self
    }

    /// Sets the cluster member addresses.
    pub fn addresses(mut self, addresses: impl IntoIterator<Item = SocketAddr>) -> Self {
        self.network = self.network.addresses(addresses);
        self
    }

    /// Sets the number of connection cycles. Zero means unbounded.
    pub fn connection_attempt_limit(mut self, limit: u32) -> Self {
        self.network = self.network.connection_attempt_limit(limit);
        self
    }

    /// Sets the minimum spacing between connection cycles.
    pub fn connection_attempt_period(mut self, period: Duration) -> Self {
        self.network = self.network.connection_attempt_period(period);
        self
    }

    /// Enables or disables shuffling of candidate addresses.
    pub fn shuffle_member_list(mut self, shuffle: bool) -> Self {
        self.network = self.network.shuffle_member_list(shuffle);
        self
    }

    /// Builds the client configuration, returning an error if validation fails.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let instance_name = self
            .instance_name
            .unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string());

        if instance_name.trim().is_empty() {
            return Err(ConfigError::new("instance_name must not be empty"));
        }

        let network = self.network.build()?;

        Ok(ClientConfig {
            instance_name,
            network,
        })
    }
}
