//! Owner-connection failover against an in-memory cluster.
//!
//! Run with: `cargo run --example owner_failover`
//!
//! Connects to one of two simulated members, kills it, and watches the
//! client move its owner connection to the survivor.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use hazelcast_cluster::core::{HazelcastError, Result};
use hazelcast_cluster::{
    ClientConfig, ClusterConnectionService, Connection, ConnectionHeartbeatListener,
    ConnectionListener, ConnectionManager, LifecycleAuthority, LifecycleService, MemberList,
    MembershipSubscriber,
};

#[derive(Debug, Default)]
struct InMemoryCluster {
    alive: Mutex<HashSet<SocketAddr>>,
    open: Mutex<Vec<Connection>>,
    listeners: Mutex<Vec<Arc<dyn ConnectionListener>>>,
}

impl InMemoryCluster {
    fn start_member(&self, address: SocketAddr) {
        self.alive.lock().insert(address);
    }

    fn kill_member(&self, address: SocketAddr) {
        self.alive.lock().remove(&address);
        let closed: Vec<Connection> = {
            let mut open = self.open.lock();
            let (closed, kept) = open.drain(..).partition(|c| c.endpoint() == address);
            *open = kept;
            closed
        };
        let listeners = self.listeners.lock().clone();
        for connection in &closed {
            for listener in &listeners {
                listener.connection_removed(connection);
            }
        }
    }
}

#[async_trait]
impl ConnectionManager for InMemoryCluster {
    async fn get_or_connect(&self, address: SocketAddr, _as_owner: bool) -> Result<Connection> {
        if !self.alive.lock().contains(&address) {
            return Err(HazelcastError::Connection(format!(
                "connection refused: {}",
                address
            )));
        }
        let connection = Connection::new(address);
        self.open.lock().push(connection.clone());
        Ok(connection)
    }

    fn destroy_connection(&self, connection: &Connection, _reason: HazelcastError) {
        self.open.lock().retain(|c| c != connection);
    }

    fn add_connection_listener(&self, listener: Arc<dyn ConnectionListener>) {
        self.listeners.lock().push(listener);
    }

    fn add_heartbeat_listener(&self, _listener: Arc<dyn ConnectionHeartbeatListener>) {}
}

#[derive(Debug)]
struct PrintingSubscriber;

#[async_trait]
impl MembershipSubscriber for PrintingSubscriber {
    async fn listen_membership_events(&self, owner: SocketAddr) -> Result<()> {
        println!("  subscribed to membership events on {}", owner);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Owner Connection Failover Example ===\n");

    let first: SocketAddr = "127.0.0.1:5701".parse()?;
    let second: SocketAddr = "127.0.0.1:5702".parse()?;

    let cluster = Arc::new(InMemoryCluster::default());
    cluster.start_member(first);
    cluster.start_member(second);

    let config = ClientConfig::builder()
        .instance_name("failover-demo")
        .addresses([first, second])
        .connection_attempt_limit(3)
        .connection_attempt_period(Duration::from_millis(500))
        .shuffle_member_list(false)
        .build()?;

    let lifecycle = Arc::new(LifecycleService::new());
    let mut registration = lifecycle.add_lifecycle_listener();
    tokio::spawn(async move {
        while let Ok(event) = registration.recv().await {
            println!("  lifecycle event: {}", event);
        }
    });

    let service = ClusterConnectionService::builder(config)
        .connection_manager(cluster.clone())
        .membership_view(Arc::new(MemberList::new()))
        .membership_subscriber(Arc::new(PrintingSubscriber))
        .lifecycle(lifecycle.clone())
        .build()?;
    service.init();

    println!("--- Connecting ---");
    service.connect_to_cluster().await?;
    println!("  owner: {:?}\n", service.owner_connection_address());

    println!("--- Killing {} ---", first);
    cluster.kill_member(first);
    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("  owner: {:?}\n", service.owner_connection_address());

    println!("--- Shutting down ---");
    service.shutdown().await;
    lifecycle.shutdown().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n=== Example completed ===");
    Ok(())
}
