//! Bounded, time-paced establishment of the owner connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::instrument;

use hazelcast_core::{HazelcastError, Result};

use super::address_source::AddressSource;
use super::dispatcher::EventDispatcher;
use super::lifecycle_service::LifecycleAuthority;
use super::owner::OwnerState;
use crate::connection::{Connection, ConnectionManager};
use crate::listener::{LifecycleEvent, MembershipSubscriber};

/// Drives the owner-connection retry loop.
///
/// Each invocation of [`connect_to_cluster`](Self::connect_to_cluster) runs
/// up to `attempt_limit` cycles. A cycle walks a freshly assembled candidate
/// list and stops at the first address that yields an authenticated
/// connection with a live membership subscription. Cycle starts are spaced
/// at least `attempt_period` apart, and the wait between them ends early
/// when the lifecycle stops running.
#[derive(Debug, Clone)]
pub struct ClusterConnector {
    connection_manager: Arc<dyn ConnectionManager>,
    membership_subscriber: Arc<dyn MembershipSubscriber>,
    address_source: AddressSource,
    lifecycle: Arc<dyn LifecycleAuthority>,
    dispatcher: EventDispatcher,
    attempt_limit: u32,
    attempt_period: Duration,
    owner: Arc<OwnerState>,
}

impl ClusterConnector {
    /// Creates a connector.
    ///
    /// `attempt_limit` is the effective limit; pass `u32::MAX` for an
    /// unbounded loop.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connection_manager: Arc<dyn ConnectionManager>,
        membership_subscriber: Arc<dyn MembershipSubscriber>,
        address_source: AddressSource,
        lifecycle: Arc<dyn LifecycleAuthority>,
        dispatcher: EventDispatcher,
        attempt_limit: u32,
        attempt_period: Duration,
        owner: Arc<OwnerState>,
    ) -> Self {
        Self {
            connection_manager,
            membership_subscriber,
            address_source,
            lifecycle,
            dispatcher,
            attempt_limit,
            attempt_period,
            owner,
        }
    }

    /// Returns the shared owner state this connector publishes into.
    pub fn owner(&self) -> &Arc<OwnerState> {
        &self.owner
    }

    /// Returns the effective attempt limit.
    pub fn attempt_limit(&self) -> u32 {
        self.attempt_limit
    }

    /// Returns the minimum spacing between cycle starts.
    pub fn attempt_period(&self) -> Duration {
        self.attempt_period
    }

    /// Connects to the cluster, designating one owner connection.
    ///
    /// # Errors
    ///
    /// Returns [`HazelcastError::ClusterUnreachable`] listing every address
    /// tried if the attempt budget runs out or the lifecycle stops first.
    /// An address provider failure aborts the call with that error.
    #[instrument(
        name = "cluster_connector.connect",
        skip(self),
        fields(
            attempt_limit = self.attempt_limit,
            attempt_period_ms = self.attempt_period.as_millis() as u64
        )
    )]
    pub async fn connect_to_cluster(&self) -> Result<()> {
        self.owner.clear_address();
        let mut tried: Vec<SocketAddr> = Vec::new();
        let mut running = self.lifecycle.subscribe_running();
        let mut attempt = 0u32;

        while attempt < self.attempt_limit {
            if !self.lifecycle.is_running() {
                tracing::debug!(
                    attempt = attempt,
                    "giving up on cluster connection, client is not running"
                );
                break;
            }

            attempt += 1;
            let next_try = Instant::now() + self.attempt_period;

            if self.connect_once(&mut tried).await? {
                return Ok(());
            }

            let remaining = next_try.saturating_duration_since(Instant::now());
            tracing::warn!(
                remaining_ms = remaining.as_millis() as u64,
                attempt = attempt,
                limit = self.attempt_limit,
                "unable to get alive cluster connection, retrying"
            );

            if !remaining.is_zero() && !pace(remaining, &mut running).await {
                tracing::debug!(
                    attempt = attempt,
                    "cluster connection wait cancelled, client is not running"
                );
                break;
            }
        }

        Err(HazelcastError::ClusterUnreachable { tried })
    }

    /// Runs one pass over the candidates. Returns `Ok(true)` on success.
    async fn connect_once(&self, tried: &mut Vec<SocketAddr>) -> Result<bool> {
        let candidates = self.address_source.candidate_addresses().await?;

        for address in candidates {
            if !self.lifecycle.is_running() {
                break;
            }
            if !tried.contains(&address) {
                tried.push(address);
            }

            match self.establish_owner(address).await {
                Ok(connection) => {
                    tracing::info!(
                        address = %address,
                        connection = %connection,
                        "owner connection established"
                    );
                    return Ok(true);
                }
                Err(e) if e.is_authentication() => {
                    tracing::warn!(address = %address, error = %e, "owner authentication rejected");
                }
                Err(e) => {
                    tracing::debug!(address = %address, error = %e, "owner connection attempt failed");
                }
            }
        }

        Ok(false)
    }

    /// Connects to `address`, subscribes membership events, then publishes it
    /// as owner. Nothing is published unless every step succeeds.
    async fn establish_owner(&self, address: SocketAddr) -> Result<Connection> {
        let connection = self.connection_manager.get_or_connect(address, true).await?;
        let endpoint = connection.endpoint();

        self.membership_subscriber
            .listen_membership_events(endpoint)
            .await?;

        self.owner.set_address(endpoint);
        if let Some(principal) = connection.principal() {
            self.owner.set_principal(principal.clone());
        }
        self.dispatcher.dispatch(LifecycleEvent::ClientConnected);

        Ok(connection)
    }
}

/// Waits for `remaining` unless the lifecycle stops first.
///
/// Returns `false` if the wait was cut short.
async fn pace(remaining: Duration, running: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(remaining) => true,
        _ = running.wait_for(|running| !*running) => false,
    }
}
