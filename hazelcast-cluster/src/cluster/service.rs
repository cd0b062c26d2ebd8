//! The cluster-connection service: owner connection, recovery, and shutdown.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hazelcast_core::{HazelcastError, Result};

use super::address_source::AddressSource;
use super::connector::ClusterConnector;
use super::dispatcher::EventDispatcher;
use super::lifecycle_service::{LifecycleAuthority, LifecycleService};
use super::owner::{ClientPrincipal, OwnerState};
use super::reconnection::ReconnectionHandler;
use crate::config::ClientConfig;
use crate::connection::{AddressProvider, Connection, ConnectionManager, StaticAddressProvider};
use crate::listener::{
    ConnectionHeartbeatListener, ConnectionListener, MembershipSubscriber, MembershipView,
};
use crate::runtime::{ExecutionService, TokioExecutionService};

/// Maintains the client's single owner connection to the cluster.
///
/// Created with [`ClusterConnectionService::builder`]. Call
/// [`init`](Self::init) once to register for connection and heartbeat
/// callbacks, then [`connect_to_cluster`](Self::connect_to_cluster) to
/// establish the first owner connection. Afterwards, loss of the owner
/// connection is recovered in the background.
///
/// # Example
///
/// ```ignore
/// let config = ClientConfig::builder()
///     .add_address("127.0.0.1:5701".parse()?)
///     .build()?;
///
/// let service = ClusterConnectionService::builder(config)
///     .connection_manager(connection_manager)
///     .membership_view(member_list.clone())
///     .membership_subscriber(cluster_view_listener)
///     .lifecycle(lifecycle.clone())
///     .build()?;
///
/// service.init();
/// service.connect_to_cluster().await?;
/// println!("owner: {:?}", service.owner_connection_address());
/// ```
#[derive(Debug)]
pub struct ClusterConnectionService {
    config: ClientConfig,
    connection_manager: Arc<dyn ConnectionManager>,
    lifecycle: Arc<dyn LifecycleAuthority>,
    connector: ClusterConnector,
    handler: Arc<ReconnectionHandler>,
    owner: Arc<OwnerState>,
    initialized: AtomicBool,
}

impl ClusterConnectionService {
    /// Starts building a service for `config`.
    pub fn builder(config: ClientConfig) -> ClusterConnectionServiceBuilder {
        ClusterConnectionServiceBuilder::new(config)
    }

    /// Registers for connection and heartbeat callbacks on the connection
    /// manager. Subsequent calls do nothing.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return;
        }
        let connection_listener: Arc<dyn ConnectionListener> = self.handler.clone();
        let heartbeat_listener: Arc<dyn ConnectionHeartbeatListener> = self.handler.clone();
        self.connection_manager.add_connection_listener(connection_listener);
        self.connection_manager.add_heartbeat_listener(heartbeat_listener);
        tracing::debug!(
            instance = %self.config.instance_name(),
            "cluster connection listeners registered"
        );
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the lifecycle authority this service consults.
    pub fn lifecycle(&self) -> &Arc<dyn LifecycleAuthority> {
        &self.lifecycle
    }

    /// Returns the current owner connection's endpoint, if any.
    pub fn owner_connection_address(&self) -> Option<SocketAddr> {
        self.owner.address()
    }

    /// Returns the principal from the latest owner authentication.
    pub fn principal(&self) -> Option<ClientPrincipal> {
        self.owner.principal()
    }

    /// Replaces the stored principal.
    pub fn set_principal(&self, principal: ClientPrincipal) {
        self.owner.set_principal(principal);
    }

    /// Forgets the stored principal.
    pub fn clear_principal(&self) {
        self.owner.clear_principal();
    }

    /// Establishes the owner connection.
    ///
    /// See [`ClusterConnector::connect_to_cluster`].
    pub async fn connect_to_cluster(&self) -> Result<()> {
        self.connector.connect_to_cluster().await
    }

    /// Stops background reconnection and waits for it to drain.
    ///
    /// The reconnection worker also exits by itself once the lifecycle stops,
    /// so after a failed reconnection this returns without waiting.
    pub async fn shutdown(&self) {
        self.handler.shutdown().await;
    }
}

impl ConnectionListener for ClusterConnectionService {
    fn connection_added(&self, connection: &Connection) {
        self.handler.connection_added(connection);
    }

    fn connection_removed(&self, connection: &Connection) {
        self.handler.connection_removed(connection);
    }
}

impl ConnectionHeartbeatListener for ClusterConnectionService {
    fn heartbeat_started(&self, connection: &Connection) {
        self.handler.heartbeat_started(connection);
    }

    fn heartbeat_stopped(&self, connection: &Connection) {
        self.handler.heartbeat_stopped(connection);
    }
}

/// Builder for [`ClusterConnectionService`].
///
/// The connection manager, membership view and membership subscriber are
/// required. The lifecycle defaults to a fresh [`LifecycleService`], the
/// execution service to [`TokioExecutionService`], and the address
/// providers to a [`StaticAddressProvider`] over the configured addresses.
#[derive(Debug)]
pub struct ClusterConnectionServiceBuilder {
    config: ClientConfig,
    connection_manager: Option<Arc<dyn ConnectionManager>>,
    membership_view: Option<Arc<dyn MembershipView>>,
    membership_subscriber: Option<Arc<dyn MembershipSubscriber>>,
    lifecycle: Option<Arc<dyn LifecycleAuthority>>,
    execution: Option<Arc<dyn ExecutionService>>,
    providers: Vec<Arc<dyn AddressProvider>>,
}

impl ClusterConnectionServiceBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            connection_manager: None,
            membership_view: None,
            membership_subscriber: None,
            lifecycle: None,
            execution: None,
            providers: Vec::new(),
        }
    }

    /// Sets the connection manager.
    pub fn connection_manager(mut self, manager: Arc<dyn ConnectionManager>) -> Self {
        self.connection_manager = Some(manager);
        self
    }

    /// Sets the view of current cluster members.
    pub fn membership_view(mut self, view: Arc<dyn MembershipView>) -> Self {
        self.membership_view = Some(view);
        self
    }

    /// Sets the membership-event subscriber.
    pub fn membership_subscriber(mut self, subscriber: Arc<dyn MembershipSubscriber>) -> Self {
        self.membership_subscriber = Some(subscriber);
        self
    }

    /// Sets the lifecycle authority.
    pub fn lifecycle(mut self, lifecycle: Arc<dyn LifecycleAuthority>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Sets the execution service used for event dispatch and escalation.
    pub fn execution_service(mut self, execution: Arc<dyn ExecutionService>) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Adds an address provider. Providers are consulted in the order added.
    pub fn address_provider(mut self, provider: Arc<dyn AddressProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Adds several address providers.
    pub fn address_providers(
        mut self,
        providers: impl IntoIterator<Item = Arc<dyn AddressProvider>>,
    ) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Builds the service and starts its reconnection worker.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HazelcastError::Configuration`] if a required collaborator
    /// was not supplied.
    pub fn build(self) -> Result<ClusterConnectionService> {
        let connection_manager = self
            .connection_manager
            .ok_or_else(|| missing("connection manager"))?;
        let membership_view = self
            .membership_view
            .ok_or_else(|| missing("membership view"))?;
        let membership_subscriber = self
            .membership_subscriber
            .ok_or_else(|| missing("membership subscriber"))?;
        let lifecycle = self
            .lifecycle
            .unwrap_or_else(|| Arc::new(LifecycleService::new()));
        let execution = self
            .execution
            .unwrap_or_else(|| Arc::new(TokioExecutionService));

        let network = self.config.network();
        let providers = if self.providers.is_empty() {
            vec![Arc::new(StaticAddressProvider::new(network.addresses().to_vec()))
                as Arc<dyn AddressProvider>]
        } else {
            self.providers
        };

        let owner = Arc::new(OwnerState::new());
        let dispatcher = EventDispatcher::new(Arc::clone(&execution), Arc::clone(&lifecycle));
        let connector = ClusterConnector::new(
            Arc::clone(&connection_manager),
            membership_subscriber,
            AddressSource::new(membership_view, providers, network.shuffle_member_list()),
            Arc::clone(&lifecycle),
            dispatcher.clone(),
            network.effective_attempt_limit(),
            network.connection_attempt_period(),
            Arc::clone(&owner),
        );
        let handler = Arc::new(ReconnectionHandler::new(
            self.config.instance_name(),
            connector.clone(),
            dispatcher,
            Arc::clone(&lifecycle),
            execution,
            Arc::clone(&connection_manager),
        ));

        Ok(ClusterConnectionService {
            config: self.config,
            connection_manager,
            lifecycle,
            connector,
            handler,
            owner,
            initialized: AtomicBool::new(false),
        })
    }
}

fn missing(what: &str) -> HazelcastError {
    HazelcastError::Configuration(format!("cluster connection service requires a {}", what))
}
