//! Client lifecycle event handling.

use std::fmt;

/// Listener for client state transitions.
///
/// All methods have default empty implementations, so only the transitions
/// of interest need to be overridden. Callbacks run on the execution
/// service, never on the task that detected the transition.
///
/// # Example
///
/// ```ignore
/// use hazelcast_cluster::listener::ClientStateListener;
///
/// struct MyStateListener;
///
/// impl ClientStateListener for MyStateListener {
///     fn client_connected(&self) {
///         println!("Connected to cluster!");
///     }
///
///     fn client_disconnected(&self) {
///         println!("Disconnected from cluster!");
///     }
/// }
///
/// let listener_id = lifecycle.add_client_state_listener(Arc::new(MyStateListener));
/// ```
pub trait ClientStateListener: Send + Sync {
    /// Called when the client has connected to the cluster.
    fn client_connected(&self) {}

    /// Called when the client has lost its owner connection.
    fn client_disconnected(&self) {}

    /// Called when the client begins shutting down.
    fn client_shutting_down(&self) {}

    /// Called when the client has completed shutdown.
    fn client_shutdown(&self) {}
}

impl std::fmt::Debug for dyn ClientStateListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientStateListener")
    }
}

/// Events emitted during client lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The client is beginning the shutdown process.
    ShuttingDown,
    /// The client has completed shutdown.
    Shutdown,
    /// The client has connected to the cluster.
    ClientConnected,
    /// The client has disconnected from the cluster.
    ClientDisconnected,
}

impl LifecycleEvent {
    /// Returns a human-readable name for this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::Shutdown => "SHUTDOWN",
            Self::ClientConnected => "CLIENT_CONNECTED",
            Self::ClientDisconnected => "CLIENT_DISCONNECTED",
        }
    }

    /// Invokes the callback on `listener` that corresponds to this event.
    pub fn notify(self, listener: &dyn ClientStateListener) {
        match self {
            Self::ShuttingDown => listener.client_shutting_down(),
            Self::Shutdown => listener.client_shutdown(),
            Self::ClientConnected => listener.client_connected(),
            Self::ClientDisconnected => listener.client_disconnected(),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
