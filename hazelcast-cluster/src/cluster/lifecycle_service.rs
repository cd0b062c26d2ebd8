//! Client lifecycle authority: running state, shutdown, and event fan-out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};

use crate::listener::{ClientStateListener, LifecycleEvent, ListenerId};

/// What the cluster layer needs from the client's lifecycle.
#[async_trait]
pub trait LifecycleAuthority: Send + Sync + std::fmt::Debug {
    /// Returns `true` while the client has not begun shutting down.
    fn is_running(&self) -> bool;

    /// Returns a receiver that observes the running flag.
    ///
    /// Used to cut waits short as soon as the client stops. A closed
    /// channel is treated as "stopped".
    fn subscribe_running(&self) -> watch::Receiver<bool>;

    /// Shuts the whole client down.
    async fn shutdown(&self);

    /// Delivers `event` to lifecycle subscribers on the calling task.
    fn fire_lifecycle_event(&self, event: LifecycleEvent);
}

/// Registration handle for a lifecycle event stream.
///
/// Events are received until this registration is dropped.
#[derive(Debug)]
pub struct LifecycleListenerRegistration {
    id: ListenerId,
    receiver: broadcast::Receiver<LifecycleEvent>,
}

impl LifecycleListenerRegistration {
    /// Returns the unique identifier for this registration.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Receives the next lifecycle event.
    ///
    /// Returns an error if the channel is closed or this receiver lagged.
    pub async fn recv(&mut self) -> Result<LifecycleEvent, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Result<LifecycleEvent, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Default [`LifecycleAuthority`].
///
/// Starts in the running state. Events are published both on a broadcast
/// stream (see [`add_lifecycle_listener`](Self::add_lifecycle_listener)) and
/// to registered [`ClientStateListener`]s.
///
/// # Example
///
/// ```ignore
/// let lifecycle = Arc::new(LifecycleService::new());
///
/// let mut registration = lifecycle.add_lifecycle_listener();
/// tokio::spawn(async move {
///     while let Ok(event) = registration.recv().await {
///         println!("Lifecycle event: {}", event);
///     }
/// });
///
/// lifecycle.shutdown().await;
/// assert!(!lifecycle.is_running());
/// ```
#[derive(Debug)]
pub struct LifecycleService {
    running: watch::Sender<bool>,
    shutdown_started: AtomicBool,
    events: broadcast::Sender<LifecycleEvent>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ClientStateListener>)>>,
}

impl LifecycleService {
    /// Creates a lifecycle service in the running state.
    pub fn new() -> Self {
        let (running, _) = watch::channel(true);
        let (events, _) = broadcast::channel(16);
        Self {
            running,
            shutdown_started: AtomicBool::new(false),
            events,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Subscribes to the lifecycle event stream.
    pub fn add_lifecycle_listener(&self) -> LifecycleListenerRegistration {
        LifecycleListenerRegistration {
            id: ListenerId::new(),
            receiver: self.events.subscribe(),
        }
    }

    /// Registers a state listener and returns its identifier.
    pub fn add_client_state_listener(&self, listener: Arc<dyn ClientStateListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.write().push((id, listener));
        id
    }

    /// Removes a state listener. Returns `true` if it was registered.
    pub fn remove_client_state_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }
}

impl Default for LifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleAuthority for LifecycleService {
    fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running.subscribe()
    }

    async fn shutdown(&self) {
        if self.shutdown_started.swap(true, Ordering::AcqRel) {
            tracing::debug!("lifecycle shutdown already in progress");
            return;
        }

        self.fire_lifecycle_event(LifecycleEvent::ShuttingDown);
        self.running.send_replace(false);
        self.fire_lifecycle_event(LifecycleEvent::Shutdown);
        tracing::info!("client lifecycle shut down");
    }

    fn fire_lifecycle_event(&self, event: LifecycleEvent) {
        tracing::info!(event = %event, "client lifecycle event");
        let _ = self.events.send(event);

        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            event.notify(listener.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[derive(Debug, Default)]
    struct CountingListener {
        connected: AtomicU32,
        shutdown: AtomicU32,
    }

    impl ClientStateListener for CountingListener {
        fn client_connected(&self) {
            self.connected.fetch_add(1, Ordering::SeqCst);
        }

        fn client_shutdown(&self) {
            self.shutdown.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lifecycle_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LifecycleService>();
    }

    #[test]
    fn test_starts_running() {
        let service = LifecycleService::new();
        assert!(service.is_running());
        assert!(*service.subscribe_running().borrow());
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_and_emits_events() {
        let service = LifecycleService::new();
        let mut registration = service.add_lifecycle_listener();
        let mut running = service.subscribe_running();

        service.shutdown().await;

        assert!(!service.is_running());
        running.changed().await.unwrap();
        assert!(!*running.borrow());
        assert_eq!(registration.recv().await.unwrap(), LifecycleEvent::ShuttingDown);
        assert_eq!(registration.recv().await.unwrap(), LifecycleEvent::Shutdown);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let service = LifecycleService::new();
        let listener = Arc::new(CountingListener::default());
        service.add_client_state_listener(listener.clone());

        service.shutdown().await;
        service.shutdown().await;

        assert_eq!(listener.shutdown.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fire_event_reaches_stream_and_state_listeners() {
        let service = LifecycleService::new();
        let listener = Arc::new(CountingListener::default());
        service.add_client_state_listener(listener.clone());
        let mut registration = service.add_lifecycle_listener();

        service.fire_lifecycle_event(LifecycleEvent::ClientConnected);

        assert_eq!(listener.connected.load(Ordering::SeqCst), 1);
        assert_eq!(registration.try_recv().unwrap(), LifecycleEvent::ClientConnected);
    }

    #[test]
    fn test_remove_client_state_listener() {
        let service = LifecycleService::new();
        let listener = Arc::new(CountingListener::default());
        let id = service.add_client_state_listener(listener.clone());

        assert!(service.remove_client_state_listener(id));
        assert!(!service.remove_client_state_listener(id));

        service.fire_lifecycle_event(LifecycleEvent::ClientConnected);
        assert_eq!(listener.connected.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registrations_have_distinct_ids() {
        let service = LifecycleService::new();
        let reg1 = service.add_lifecycle_listener();
        let reg2 = service.add_lifecycle_listener();
        assert_ne!(reg1.id(), reg2.id());
    }
}
