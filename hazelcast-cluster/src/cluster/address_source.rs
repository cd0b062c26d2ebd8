//! Candidate address assembly for a single connection pass.

use std::net::SocketAddr;
use std::sync::Arc;

use hazelcast_core::Result;
use rand::seq::SliceRandom;

use crate::connection::AddressProvider;
use crate::listener::MembershipView;

/// Builds the ordered list of addresses to try for one owner-connection pass.
///
/// Currently known members come first, in membership order, followed by
/// every provider's addresses in registration order. Duplicates are kept.
/// When shuffling is enabled the whole list is permuted uniformly.
#[derive(Debug, Clone)]
pub struct AddressSource {
    membership: Arc<dyn MembershipView>,
    providers: Vec<Arc<dyn AddressProvider>>,
    shuffle: bool,
}

impl AddressSource {
    /// Creates a source over `membership` and `providers`.
    pub fn new(
        membership: Arc<dyn MembershipView>,
        providers: Vec<Arc<dyn AddressProvider>>,
        shuffle: bool,
    ) -> Self {
        Self {
            membership,
            providers,
            shuffle,
        }
    }

    /// Returns `true` if the candidate list is shuffled on every pass.
    pub fn shuffles(&self) -> bool {
        self.shuffle
    }

    /// Assembles the candidates for one pass.
    ///
    /// A failing provider fails the whole call.
    pub async fn candidate_addresses(&self) -> Result<Vec<SocketAddr>> {
        let mut addresses: Vec<SocketAddr> = self
            .membership
            .current_members()
            .iter()
            .map(|member| member.address())
            .collect();

        for provider in &self.providers {
            addresses.extend(provider.load_addresses().await?);
        }

        if self.shuffle {
            addresses.shuffle(&mut rand::thread_rng());
        }

        tracing::trace!(count = addresses.len(), "assembled candidate addresses");
        Ok(addresses)
    }
}
