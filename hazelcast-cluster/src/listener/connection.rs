//! Callbacks raised by the connection subsystem.
//!
//! Callbacks may run concurrently with each other and with an in-flight
//! connect cycle, on whatever task the connection subsystem uses to notice
//! the change. Implementations must return promptly; any slow work belongs
//! on a queue or the execution service.

use crate::connection::Connection;

/// Notified when connections are opened or closed.
pub trait ConnectionListener: Send + Sync {
    /// A connection has been established and registered.
    fn connection_added(&self, connection: &Connection);

    /// A connection has been closed, for whatever reason.
    fn connection_removed(&self, connection: &Connection);
}

/// Notified when a connection's heartbeat starts or stops.
pub trait ConnectionHeartbeatListener: Send + Sync {
    /// Heartbeats resumed on a connection previously reported stopped.
    fn heartbeat_started(&self, connection: &Connection);

    /// The remote member stopped answering heartbeats.
    fn heartbeat_stopped(&self, connection: &Connection);
}

impl std::fmt::Debug for dyn ConnectionListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionListener")
    }
}

impl std::fmt::Debug for dyn ConnectionHeartbeatListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionHeartbeatListener")
    }
}
