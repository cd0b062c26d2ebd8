//! Handle to a connection owned by the connection subsystem.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cluster::ClientPrincipal;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An established session to a single cluster member.
///
/// This is a lightweight handle: the socket and its lifetime belong to the
/// [`ConnectionManager`](super::ConnectionManager). The cluster layer only
/// looks at the endpoint and, for owner connections, the principal issued
/// by the authentication handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    endpoint: SocketAddr,
    principal: Option<ClientPrincipal>,
}

impl Connection {
    /// Creates a handle for a connection to `endpoint`.
    pub fn new(endpoint: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            endpoint,
            principal: None,
        }
    }

    /// Attaches the principal issued when this connection authenticated as owner.
    pub fn with_principal(mut self, principal: ClientPrincipal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote endpoint of this connection.
    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    /// Returns the principal issued on owner authentication, if any.
    pub fn principal(&self) -> Option<&ClientPrincipal> {
        self.principal.as_ref()
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Connection[{}, endpoint={}]", self.id, self.endpoint)
    }
}
