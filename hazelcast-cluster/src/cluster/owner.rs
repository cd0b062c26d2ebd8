//! Owner-connection state shared between the connect path and listener callbacks.

use std::net::SocketAddr;

use parking_lot::RwLock;
use uuid::Uuid;

/// Identity issued by the cluster when the owner connection authenticates.
///
/// Kept across reconnections so a later owner connection can resume the
/// same client session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientPrincipal {
    uuid: Uuid,
    owner_uuid: Uuid,
}

impl ClientPrincipal {
    /// Creates a principal for client `uuid` owned by member `owner_uuid`.
    pub fn new(uuid: Uuid, owner_uuid: Uuid) -> Self {
        Self { uuid, owner_uuid }
    }

    /// Returns the client's UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the UUID of the member that owns this client session.
    pub fn owner_uuid(&self) -> Uuid {
        self.owner_uuid
    }
}

impl std::fmt::Display for ClientPrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ClientPrincipal{{uuid={}, ownerUuid={}}}",
            self.uuid, self.owner_uuid
        )
    }
}

/// Current owner address and principal.
///
/// Only the task running a connect cycle writes; listener callbacks read
/// concurrently. Locks are held just long enough to copy a value in or
/// out, so readers never wait on connection establishment.
#[derive(Debug, Default)]
pub struct OwnerState {
    address: RwLock<Option<SocketAddr>>,
    principal: RwLock<Option<ClientPrincipal>>,
}

impl OwnerState {
    /// Creates an empty state: no owner, no principal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner connection's endpoint, if connected.
    pub fn address(&self) -> Option<SocketAddr> {
        *self.address.read()
    }

    /// Returns `true` if `endpoint` is the current owner endpoint.
    pub fn is_owner(&self, endpoint: SocketAddr) -> bool {
        self.address() == Some(endpoint)
    }

    pub(crate) fn set_address(&self, address: SocketAddr) {
        *self.address.write() = Some(address);
    }

    pub(crate) fn clear_address(&self) {
        *self.address.write() = None;
    }

    /// Returns the principal from the most recent owner authentication.
    pub fn principal(&self) -> Option<ClientPrincipal> {
        self.principal.read().clone()
    }

    /// Stores the principal issued by the cluster.
    pub fn set_principal(&self, principal: ClientPrincipal) {
        *self.principal.write() = Some(principal);
    }

    /// Forgets the principal so the next owner connection authenticates afresh.
    pub fn clear_principal(&self) {
        *self.principal.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_accessors_and_display() {
        let uuid = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let principal = ClientPrincipal::new(uuid, owner);

        assert_eq!(principal.uuid(), uuid);
        assert_eq!(principal.owner_uuid(), owner);
        assert_eq!(
            principal.to_string(),
            format!("ClientPrincipal{{uuid={}, ownerUuid={}}}", uuid, owner)
        );
    }

    #[test]
    fn test_owner_address_lifecycle() {
        let state = OwnerState::new();
        let addr: SocketAddr = "10.0.0.1:5701".parse().unwrap();
        assert!(state.address().is_none());
        assert!(!state.is_owner(addr));

        state.set_address(addr);
        assert_eq!(state.address(), Some(addr));
        assert!(state.is_owner(addr));
        assert!(!state.is_owner("10.0.0.2:5701".parse().unwrap()));

        state.clear_address();
        assert!(state.address().is_none());
    }

    #[test]
    fn test_principal_survives_address_changes() {
        let state = OwnerState::new();
        let principal = ClientPrincipal::new(Uuid::new_v4(), Uuid::new_v4());
        state.set_principal(principal.clone());

        state.set_address("10.0.0.1:5701".parse().unwrap());
        state.clear_address();
        assert_eq!(state.principal(), Some(principal));

        state.clear_principal();
        assert!(state.principal().is_none());
    }

    #[test]
    fn test_owner_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OwnerState>();
    }
}
