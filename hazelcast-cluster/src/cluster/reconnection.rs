//! Recovery of a lost owner connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use hazelcast_core::HazelcastError;

use super::connector::ClusterConnector;
use super::dispatcher::EventDispatcher;
use super::lifecycle_service::LifecycleAuthority;
use super::owner::OwnerState;
use crate::connection::{Connection, ConnectionManager};
use crate::listener::{ConnectionHeartbeatListener, ConnectionListener, LifecycleEvent};
use crate::runtime::ExecutionService;

/// Upper bound on how long [`ReconnectionHandler::shutdown`] waits for the
/// queue to drain.
pub const RECONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Reacts to owner-connection loss by reconnecting on a serial queue.
///
/// Removal of the owner connection enqueues the lost endpoint. A single
/// worker task takes entries one at a time, dispatches
/// [`LifecycleEvent::ClientDisconnected`] and runs a full
/// [`ClusterConnector::connect_to_cluster`]. If that fails the client is
/// shut down; nothing is re-enqueued.
///
/// A stopped heartbeat on the owner connection only asks the connection
/// manager to destroy it. Recovery then follows from the resulting
/// `connection_removed` callback.
///
/// The worker exits on its own once the lifecycle stops running, whether
/// through [`shutdown`](Self::shutdown) or a failed reconnection.
#[derive(Debug)]
pub struct ReconnectionHandler {
    owner: Arc<OwnerState>,
    lifecycle: Arc<dyn LifecycleAuthority>,
    connection_manager: Arc<dyn ConnectionManager>,
    queue: Mutex<Option<mpsc::UnboundedSender<SocketAddr>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReconnectionHandler {
    /// Creates the handler and starts its worker on the current Tokio runtime.
    pub fn new(
        instance_name: &str,
        connector: ClusterConnector,
        dispatcher: EventDispatcher,
        lifecycle: Arc<dyn LifecycleAuthority>,
        execution: Arc<dyn ExecutionService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let owner = Arc::clone(connector.owner());
        let (sender, receiver) = mpsc::unbounded_channel();

        let worker = ReconnectionWorker {
            connector,
            dispatcher,
            lifecycle: Arc::clone(&lifecycle),
            execution,
        };
        let span = tracing::info_span!("cluster_reconnection", instance = %instance_name);
        let handle = tokio::spawn(worker.run(receiver).instrument(span));

        Self {
            owner,
            lifecycle,
            connection_manager,
            queue: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Stops accepting reconnection work and waits for queued work to drain.
    ///
    /// Waits at most [`RECONNECTION_DRAIN_TIMEOUT`]; after that the worker
    /// is left to finish on its own. Later calls return immediately.
    pub async fn shutdown(&self) {
        drop(self.queue.lock().take());

        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            tracing::debug!("reconnection handler already shut down");
            return;
        };

        match tokio::time::timeout(RECONNECTION_DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => tracing::debug!("reconnection queue drained"),
            Ok(Err(e)) => tracing::warn!(error = %e, "reconnection worker terminated abnormally"),
            Err(_) => tracing::warn!(
                timeout = ?RECONNECTION_DRAIN_TIMEOUT,
                "reconnection queue did not drain before timeout"
            ),
        }
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.queue.lock().is_none()
    }

    fn enqueue(&self, endpoint: SocketAddr) {
        let queue = self.queue.lock();
        let Some(sender) = queue.as_ref() else {
            tracing::debug!(address = %endpoint, "reconnection queue closed, ignoring owner loss");
            return;
        };
        if sender.send(endpoint).is_err() {
            tracing::debug!(address = %endpoint, "reconnection worker gone, ignoring owner loss");
        }
    }
}

impl ConnectionListener for ReconnectionHandler {
    fn connection_added(&self, _connection: &Connection) {}

    fn connection_removed(&self, connection: &Connection) {
        let endpoint = connection.endpoint();
        if self.owner.is_owner(endpoint) && self.lifecycle.is_running() {
            tracing::debug!(address = %endpoint, "owner connection removed, scheduling reconnection");
            self.enqueue(endpoint);
        }
    }
}

impl ConnectionHeartbeatListener for ReconnectionHandler {
    fn heartbeat_started(&self, _connection: &Connection) {}

    fn heartbeat_stopped(&self, connection: &Connection) {
        let endpoint = connection.endpoint();
        if self.owner.is_owner(endpoint) {
            tracing::debug!(address = %endpoint, "owner heartbeat stopped, destroying connection");
            self.connection_manager.destroy_connection(
                connection,
                HazelcastError::TargetDisconnected(format!(
                    "heartbeat timed out to owner connection {}",
                    connection
                )),
            );
        }
    }
}

struct ReconnectionWorker {
    connector: ClusterConnector,
    dispatcher: EventDispatcher,
    lifecycle: Arc<dyn LifecycleAuthority>,
    execution: Arc<dyn ExecutionService>,
}

impl ReconnectionWorker {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<SocketAddr>) {
        let mut running = self.lifecycle.subscribe_running();
        loop {
            tokio::select! {
                biased;
                entry = receiver.recv() => match entry {
                    Some(endpoint) => self.reconnect(endpoint).await,
                    None => break,
                },
                _ = async { let _ = running.wait_for(|running| !*running).await; } => {
                    tracing::debug!("client stopped, abandoning reconnection queue");
                    break;
                }
            }
        }
        tracing::debug!("reconnection worker stopped");
    }

    async fn reconnect(&self, endpoint: SocketAddr) {
        if !self.connector.owner().is_owner(endpoint) || !self.lifecycle.is_running() {
            tracing::debug!(address = %endpoint, "dropping stale reconnection request");
            return;
        }

        self.dispatcher.dispatch(LifecycleEvent::ClientDisconnected);

        if let Err(e) = self.connector.connect_to_cluster().await {
            tracing::warn!(error = %e, "could not re-connect to cluster, shutting down the client");
            let lifecycle = Arc::clone(&self.lifecycle);
            self.execution.execute(Box::pin(async move {
                lifecycle.shutdown().await;
            }));
        }
    }
}
