//! Owner-connection management for the Hazelcast client.

mod address_source;
mod connector;
mod dispatcher;
mod lifecycle_service;
mod owner;
mod reconnection;
mod service;

pub use address_source::AddressSource;
pub use connector::ClusterConnector;
pub use dispatcher::EventDispatcher;
pub use lifecycle_service::{LifecycleAuthority, LifecycleListenerRegistration, LifecycleService};
pub use owner::{ClientPrincipal, OwnerState};
pub use reconnection::{ReconnectionHandler, RECONNECTION_DRAIN_TIMEOUT};
pub use service::{ClusterConnectionService, ClusterConnectionServiceBuilder};
