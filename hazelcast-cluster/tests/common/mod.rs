//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use hazelcast_cluster::core::{HazelcastError, Result};
use hazelcast_cluster::{
    AddressProvider, ClientConfig, ClientPrincipal, ClientStateListener, ClusterConnectionService,
    Connection, ConnectionHeartbeatListener, ConnectionListener, ConnectionManager,
    LifecycleEvent, LifecycleService, Member, MemberList, MembershipSubscriber,
};

pub fn addr(s: &str) -> SocketAddr {
    s.parse().expect("valid socket address")
}

pub fn member(address: &str) -> Member {
    Member::new(Uuid::new_v4(), addr(address))
}

/// Builds a config with shuffling disabled so candidate order is predictable.
pub fn config(limit: u32, period: Duration, addresses: &[&str]) -> ClientConfig {
    ClientConfig::builder()
        .instance_name("test-client")
        .addresses(addresses.iter().map(|a| addr(a)))
        .connection_attempt_limit(limit)
        .connection_attempt_period(period)
        .shuffle_member_list(false)
        .build()
        .expect("failed to build config")
}

/// What the mock connection manager does for one connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Connect,
    Refuse,
    RejectCredentials,
}

/// Connection manager driven by per-address scripts.
///
/// Each address plays its script front to back; the last outcome repeats.
/// Unscripted addresses refuse.
#[derive(Debug, Default)]
pub struct MockConnectionManager {
    scripts: Mutex<HashMap<SocketAddr, VecDeque<Outcome>>>,
    principal: Mutex<Option<ClientPrincipal>>,
    attempts: Mutex<Vec<SocketAddr>>,
    destroyed: Mutex<Vec<(Connection, String)>>,
    connections: Mutex<HashMap<SocketAddr, Connection>>,
    connection_listeners: Mutex<Vec<Arc<dyn ConnectionListener>>>,
    heartbeat_listeners: Mutex<Vec<Arc<dyn ConnectionHeartbeatListener>>>,
    remove_on_destroy: AtomicBool,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, address: SocketAddr, outcomes: impl IntoIterator<Item = Outcome>) {
        self.scripts.lock().insert(address, outcomes.into_iter().collect());
    }

    /// Principal attached to every connection handed out from now on.
    pub fn issue_principal(&self, principal: Option<ClientPrincipal>) {
        *self.principal.lock() = principal;
    }

    /// Makes `destroy_connection` report the connection as removed, the way
    /// a real connection manager does.
    pub fn remove_on_destroy(&self) {
        self.remove_on_destroy.store(true, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<SocketAddr> {
        self.attempts.lock().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }

    pub fn destroyed(&self) -> Vec<(Connection, String)> {
        self.destroyed.lock().clone()
    }

    pub fn connection_to(&self, address: SocketAddr) -> Option<Connection> {
        self.connections.lock().get(&address).cloned()
    }

    pub fn connection_listener_count(&self) -> usize {
        self.connection_listeners.lock().len()
    }

    pub fn heartbeat_listener_count(&self) -> usize {
        self.heartbeat_listeners.lock().len()
    }

    pub fn fire_connection_removed(&self, connection: &Connection) {
        let listeners = self.connection_listeners.lock().clone();
        for listener in listeners {
            listener.connection_removed(connection);
        }
    }

    pub fn fire_heartbeat_stopped(&self, connection: &Connection) {
        let listeners = self.heartbeat_listeners.lock().clone();
        for listener in listeners {
            listener.heartbeat_stopped(connection);
        }
    }

    fn next_outcome(&self, address: SocketAddr) -> Outcome {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(&address) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap_or(Outcome::Refuse),
            Some(script) => script.front().copied().unwrap_or(Outcome::Refuse),
            None => Outcome::Refuse,
        }
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn get_or_connect(&self, address: SocketAddr, as_owner: bool) -> Result<Connection> {
        assert!(as_owner, "owner connections must be requested as owner");
        self.attempts.lock().push(address);

        match self.next_outcome(address) {
            Outcome::Connect => {
                let mut connection = Connection::new(address);
                if let Some(principal) = self.principal.lock().clone() {
                    connection = connection.with_principal(principal);
                }
                self.connections.lock().insert(address, connection.clone());
                Ok(connection)
            }
            Outcome::Refuse => Err(HazelcastError::Connection(format!(
                "connection refused: {}",
                address
            ))),
            Outcome::RejectCredentials => Err(HazelcastError::Authentication(format!(
                "invalid credentials for {}",
                address
            ))),
        }
    }

    fn destroy_connection(&self, connection: &Connection, reason: HazelcastError) {
        self.destroyed.lock().push((connection.clone(), reason.to_string()));
        if self.remove_on_destroy.load(Ordering::SeqCst) {
            self.fire_connection_removed(connection);
        }
    }

    fn add_connection_listener(&self, listener: Arc<dyn ConnectionListener>) {
        self.connection_listeners.lock().push(listener);
    }

    fn add_heartbeat_listener(&self, listener: Arc<dyn ConnectionHeartbeatListener>) {
        self.heartbeat_listeners.lock().push(listener);
    }
}

/// Membership subscriber that records every subscription.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    failing: Mutex<Vec<SocketAddr>>,
    subscribed: Mutex<Vec<SocketAddr>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, address: SocketAddr) {
        self.failing.lock().push(address);
    }

    pub fn subscribed(&self) -> Vec<SocketAddr> {
        self.subscribed.lock().clone()
    }
}

#[async_trait]
impl MembershipSubscriber for RecordingSubscriber {
    async fn listen_membership_events(&self, owner: SocketAddr) -> Result<()> {
        if self.failing.lock().contains(&owner) {
            return Err(HazelcastError::Connection(format!(
                "membership subscription failed on {}",
                owner
            )));
        }
        self.subscribed.lock().push(owner);
        Ok(())
    }
}

/// Address provider that always fails.
#[derive(Debug)]
pub struct FailingProvider;

#[async_trait]
impl AddressProvider for FailingProvider {
    async fn load_addresses(&self) -> Result<Vec<SocketAddr>> {
        Err(HazelcastError::Connection("discovery endpoint unavailable".into()))
    }
}

/// Records lifecycle events as they reach state listeners.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl EventRecorder {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: LifecycleEvent) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }
}

impl ClientStateListener for EventRecorder {
    fn client_connected(&self) {
        self.events.lock().push(LifecycleEvent::ClientConnected);
    }

    fn client_disconnected(&self) {
        self.events.lock().push(LifecycleEvent::ClientDisconnected);
    }

    fn client_shutting_down(&self) {
        self.events.lock().push(LifecycleEvent::ShuttingDown);
    }

    fn client_shutdown(&self) {
        self.events.lock().push(LifecycleEvent::Shutdown);
    }
}

/// A service wired to mocks.
pub struct Harness {
    pub manager: Arc<MockConnectionManager>,
    pub subscriber: Arc<RecordingSubscriber>,
    pub members: Arc<MemberList>,
    pub lifecycle: Arc<LifecycleService>,
    pub events: Arc<EventRecorder>,
    pub service: Arc<ClusterConnectionService>,
}

pub struct HarnessBuilder {
    config: ClientConfig,
    members: Vec<Member>,
    providers: Vec<Arc<dyn AddressProvider>>,
}

impl HarnessBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            members: Vec::new(),
            providers: Vec::new(),
        }
    }

    pub fn members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn AddressProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> Harness {
        let manager = Arc::new(MockConnectionManager::new());
        let subscriber = Arc::new(RecordingSubscriber::new());
        let members = Arc::new(MemberList::new());
        members.set_members(self.members);
        let lifecycle = Arc::new(LifecycleService::new());
        let events = Arc::new(EventRecorder::default());
        lifecycle.add_client_state_listener(events.clone());

        let service = ClusterConnectionService::builder(self.config)
            .connection_manager(manager.clone())
            .membership_view(members.clone())
            .membership_subscriber(subscriber.clone())
            .lifecycle(lifecycle.clone())
            .address_providers(self.providers)
            .build()
            .expect("failed to build service");
        service.init();

        Harness {
            manager,
            subscriber,
            members,
            lifecycle,
            events,
            service: Arc::new(service),
        }
    }
}

/// Polls `condition` until it holds, sleeping briefly between checks.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

/// Lets spawned tasks run without advancing time.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
