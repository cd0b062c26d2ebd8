//! Supplemental sources of candidate member addresses.

use std::net::SocketAddr;

use async_trait::async_trait;
use hazelcast_core::Result;

/// Supplies candidate member addresses beyond the currently known members.
///
/// Implementations may consult static configuration, DNS, or a cloud API;
/// each call should reflect the provider's latest knowledge.
#[async_trait]
pub trait AddressProvider: Send + Sync + std::fmt::Debug {
    /// Loads the provider's current candidate addresses.
    async fn load_addresses(&self) -> Result<Vec<SocketAddr>>;
}

/// Address provider backed by a fixed list of addresses.
#[derive(Debug, Clone)]
pub struct StaticAddressProvider {
    addresses: Vec<SocketAddr>,
}

impl StaticAddressProvider {
    /// Creates a provider that always returns `addresses`.
    pub fn new(addresses: Vec<SocketAddr>) -> Self {
        Self { addresses }
    }

    /// Returns the configured addresses.
    pub fn addresses(&self) -> &[SocketAddr] {
        &self.addresses
    }
}

#[async_trait]
impl AddressProvider for StaticAddressProvider {
    async fn load_addresses(&self) -> Result<Vec<SocketAddr>> {
        Ok(self.addresses.clone())
    }
}

impl<T> From<T> for StaticAddressProvider
where
    T: IntoIterator<Item = SocketAddr>,
{
    fn from(addresses: T) -> Self {
        Self::new(addresses.into_iter().collect())
    }
}
