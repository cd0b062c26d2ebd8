//! Cluster-connection lifecycle management for the [Hazelcast](https://hazelcast.com/) client.
//!
//! This crate keeps a client attached to its cluster through a single
//! designated *owner connection*. It picks candidate member addresses,
//! retries under a bounded and time-paced policy, keeps a membership
//! subscription alive on the owner connection, and recovers in the
//! background when that connection is lost. Everything runs on
//! [Tokio](https://tokio.rs/).
//!
//! Socket I/O, authentication, membership decoding and address discovery
//! stay outside this crate. They plug in through the traits in
//! [`connection`] and [`listener`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hazelcast_cluster::{ClientConfig, ClusterConnectionService, LifecycleService, MemberList};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .add_address("10.0.0.1:5701".parse()?)
//!         .connection_attempt_limit(5)
//!         .build()?;
//!
//!     let lifecycle = Arc::new(LifecycleService::new());
//!     let service = ClusterConnectionService::builder(config)
//!         .connection_manager(my_connection_manager)
//!         .membership_view(Arc::new(MemberList::new()))
//!         .membership_subscriber(my_membership_listener)
//!         .lifecycle(lifecycle.clone())
//!         .build()?;
//!
//!     service.init();
//!     service.connect_to_cluster().await?;
//!     println!("owner: {:?}", service.owner_connection_address());
//!
//!     service.shutdown().await;
//!     lifecycle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Retry Policy
//!
//! | Setting | Default | Meaning |
//! |---------|---------|---------|
//! | `connection_attempt_limit` | 2 | Cycles per connect call; 0 means unbounded |
//! | `connection_attempt_period` | 3000 ms | Minimum spacing between cycle starts |
//! | `shuffle_member_list` | `true` | Randomize candidate order each cycle |
//!
//! # Lifecycle Events
//!
//! [`LifecycleEvent::ClientConnected`] and [`LifecycleEvent::ClientDisconnected`]
//! are delivered through the [`runtime::ExecutionService`], never on the task
//! that observed the change.
//!
//! # Feature Flags
//!
//! - `config-file`: load [`ClientConfig`] from YAML or TOML files.

#![warn(missing_docs)]

pub mod cluster;
pub mod config;
pub mod config_file;
pub mod connection;
pub mod listener;
pub mod runtime;

pub use cluster::{
    AddressSource, ClientPrincipal, ClusterConnectionService, ClusterConnectionServiceBuilder,
    ClusterConnector, EventDispatcher, LifecycleAuthority, LifecycleListenerRegistration,
    LifecycleService, OwnerState, ReconnectionHandler,
};
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, NetworkConfig, NetworkConfigBuilder};
pub use config_file::{FileConfig, FileNetworkConfig};
#[cfg(feature = "config-file")]
pub use config_file::load_config;
pub use connection::{
    AddressProvider, Connection, ConnectionId, ConnectionManager, StaticAddressProvider,
};
pub use hazelcast_core as core;
pub use listener::{
    ClientStateListener, ConnectionHeartbeatListener, ConnectionListener, LifecycleEvent,
    ListenerId, Member, MemberEvent, MemberEventType, MemberList, MembershipSubscriber,
    MembershipView,
};
pub use runtime::{ExecutionService, Task, TokioExecutionService};
