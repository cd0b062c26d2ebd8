//! Connection handles and the contracts of the connection subsystem.

mod connection;
mod discovery;
mod manager;

pub use connection::{Connection, ConnectionId};
pub use discovery::{AddressProvider, StaticAddressProvider};
pub use manager::ConnectionManager;
