//! Listener contracts and event types exchanged with the rest of the client.

mod connection;
mod lifecycle;
mod membership;

pub use connection::{ConnectionHeartbeatListener, ConnectionListener};
pub use lifecycle::{ClientStateListener, LifecycleEvent};
pub use membership::{
    Member, MemberEvent, MemberEventType, MemberList, MembershipSubscriber, MembershipView,
};

use uuid::Uuid;

/// Unique identifier for a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Creates a new unique listener ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_id_uniqueness() {
        let id1 = ListenerId::new();
        let id2 = ListenerId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_listener_id_display() {
        let id = ListenerId::new();
        assert!(id.to_string().starts_with("listener-"));
        assert!(id.to_string().ends_with(&id.as_uuid().to_string()));
    }

    #[test]
    fn test_listener_id_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ListenerId>();
    }
}
