//! Contract the cluster layer needs from the connection subsystem.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use hazelcast_core::{HazelcastError, Result};

use super::connection::Connection;
use crate::listener::{ConnectionHeartbeatListener, ConnectionListener};

/// Opens, tracks, and tears down connections to cluster members.
///
/// Socket I/O, the authentication handshake, and connect timeouts are all
/// the implementation's business; the cluster layer only asks for a
/// connection and reacts to the listener callbacks.
#[async_trait]
pub trait ConnectionManager: Send + Sync + std::fmt::Debug {
    /// Returns an authenticated connection to `address`, opening one if needed.
    ///
    /// When `as_owner` is set the connection authenticates as the client's
    /// owner connection. Rejected credentials must surface as
    /// [`HazelcastError::Authentication`] so they can be told apart from
    /// plain connectivity failures.
    async fn get_or_connect(&self, address: SocketAddr, as_owner: bool) -> Result<Connection>;

    /// Requests that `connection` be closed for the given reason.
    ///
    /// Must return without waiting for the close to finish. Destroying a
    /// connection that is already gone is a no-op.
    fn destroy_connection(&self, connection: &Connection, reason: HazelcastError);

    /// Registers a listener for connection added/removed notifications.
    fn add_connection_listener(&self, listener: Arc<dyn ConnectionListener>);

    /// Registers a listener for heartbeat started/stopped notifications.
    fn add_heartbeat_listener(&self, listener: Arc<dyn ConnectionHeartbeatListener>);
}
