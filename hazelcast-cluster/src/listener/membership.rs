//! Cluster membership types and the contracts the connector needs from the
//! membership subsystem.

use std::collections::HashMap;
use std::net::SocketAddr;

use async_trait::async_trait;
use hazelcast_core::Result;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Type of membership event fired when cluster topology changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberEventType {
    /// A new member joined the cluster.
    Added,
    /// A member left the cluster.
    Removed,
}

impl std::fmt::Display for MemberEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "ADDED"),
            Self::Removed => write!(f, "REMOVED"),
        }
    }
}

/// A member of the Hazelcast cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    uuid: Uuid,
    address: SocketAddr,
    attributes: HashMap<String, String>,
    lite_member: bool,
}

impl Member {
    /// Creates a new cluster member.
    pub fn new(uuid: Uuid, address: SocketAddr) -> Self {
        Self {
            uuid,
            address,
            attributes: HashMap::new(),
            lite_member: false,
        }
    }

    /// Creates a new cluster member with attributes.
    pub fn with_attributes(
        uuid: Uuid,
        address: SocketAddr,
        attributes: HashMap<String, String>,
        lite_member: bool,
    ) -> Self {
        Self {
            uuid,
            address,
            attributes,
            lite_member,
        }
    }

    /// Returns the member's UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the member's socket address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns the member's attributes.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Returns whether this is a lite member.
    pub fn is_lite_member(&self) -> bool {
        self.lite_member
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Member[uuid={}, address={}]", self.uuid, self.address)
    }
}

/// An event fired when a cluster member joins or leaves.
#[derive(Debug, Clone)]
pub struct MemberEvent {
    /// The member that triggered the event.
    pub member: Member,
    /// The type of membership change.
    pub event_type: MemberEventType,
}

impl MemberEvent {
    /// Creates an event for a member that joined the cluster.
    pub fn member_added(member: Member) -> Self {
        Self {
            member,
            event_type: MemberEventType::Added,
        }
    }

    /// Creates an event for a member that left the cluster.
    pub fn member_removed(member: Member) -> Self {
        Self {
            member,
            event_type: MemberEventType::Removed,
        }
    }
}

impl std::fmt::Display for MemberEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemberEvent[{} {}]", self.member, self.event_type)
    }
}

/// Read access to the client's current view of the cluster.
pub trait MembershipView: Send + Sync + std::fmt::Debug {
    /// Returns the currently known members, in view order.
    fn current_members(&self) -> Vec<Member>;
}

/// Starts the membership-event subscription on the owner connection.
#[async_trait]
pub trait MembershipSubscriber: Send + Sync + std::fmt::Debug {
    /// Subscribes to membership events through the member at `owner`.
    async fn listen_membership_events(&self, owner: SocketAddr) -> Result<()>;
}

/// In-memory membership view that preserves the order members were reported in.
#[derive(Debug)]
pub struct MemberList {
    members: RwLock<Vec<Member>>,
    sender: broadcast::Sender<MemberEvent>,
}

impl MemberList {
    /// Creates an empty member list.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            members: RwLock::new(Vec::new()),
            sender,
        }
    }

    /// Subscribes to member added/removed events.
    pub fn subscribe(&self) -> broadcast::Receiver<MemberEvent> {
        self.sender.subscribe()
    }

    /// Replaces the whole member list, e.g. from an initial membership snapshot.
    pub fn set_members(&self, members: Vec<Member>) {
        let mut current = self.members.write();
        for member in current.drain(..) {
            let _ = self.sender.send(MemberEvent::member_removed(member));
        }
        for member in &members {
            let _ = self.sender.send(MemberEvent::member_added(member.clone()));
        }
        *current = members;
        tracing::info!(count = current.len(), "initialized cluster member list");
    }

    /// Adds a member, replacing any existing entry with the same UUID.
    pub fn add_member(&self, member: Member) {
        let mut current = self.members.write();
        match current.iter_mut().find(|m| m.uuid() == member.uuid()) {
            Some(existing) => *existing = member.clone(),
            None => current.push(member.clone()),
        }
        tracing::info!(uuid = %member.uuid(), address = %member.address(), "cluster member added");
        let _ = self.sender.send(MemberEvent::member_added(member));
    }

    /// Removes the member with the given UUID, returning it if it was known.
    pub fn remove_member(&self, uuid: Uuid) -> Option<Member> {
        let mut current = self.members.write();
        let index = current.iter().position(|m| m.uuid() == uuid);
        let Some(index) = index else {
            tracing::warn!(uuid = %uuid, "received removal for unknown member");
            return None;
        };
        let member = current.remove(index);
        tracing::info!(uuid = %uuid, address = %member.address(), "cluster member removed");
        let _ = self.sender.send(MemberEvent::member_removed(member.clone()));
        Some(member)
    }

    /// Returns the number of known members.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns `true` if no members are known.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl Default for MemberList {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipView for MemberList {
    fn current_members(&self) -> Vec<Member> {
        self.members.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(port: u16) -> Member {
        Member::new(Uuid::new_v4(), SocketAddr::from(([10, 0, 0, 1], port)))
    }

    #[test]
    fn test_member_creation() {
        let uuid = Uuid::new_v4();
        let addr: SocketAddr = "127.0.0.1:5701".parse().unwrap();
        let member = Member::new(uuid, addr);

        assert_eq!(member.uuid(), uuid);
        assert_eq!(member.address(), addr);
        assert!(member.attributes().is_empty());
        assert!(!member.is_lite_member());
    }

    #[test]
    fn test_member_with_attributes() {
        let mut attrs = HashMap::new();
        attrs.insert("zone".to_string(), "us-east-1".to_string());
        let member = Member::with_attributes(
            Uuid::new_v4(),
            "192.168.1.100:5701".parse().unwrap(),
            attrs,
            true,
        );

        assert_eq!(member.attributes().get("zone").map(String::as_str), Some("us-east-1"));
        assert!(member.is_lite_member());
    }

    #[test]
    fn test_member_display() {
        let uuid = Uuid::new_v4();
        let member = Member::new(uuid, "127.0.0.1:5701".parse().unwrap());

        let display = member.to_string();
        assert!(display.contains("Member["));
        assert!(display.contains(&uuid.to_string()));
        assert!(display.contains("127.0.0.1:5701"));
    }

    #[test]
    fn test_member_event_display() {
        let event = MemberEvent::member_removed(member(5701));
        assert!(event.to_string().ends_with("REMOVED]"));
    }

    #[test]
    fn test_member_list_preserves_view_order() {
        let list = MemberList::new();
        let (a, b, c) = (member(5703), member(5701), member(5702));
        list.add_member(a.clone());
        list.add_member(b.clone());
        list.add_member(c.clone());

        assert_eq!(list.current_members(), vec![a, b, c]);
    }

    #[test]
    fn test_member_list_add_replaces_same_uuid() {
        let list = MemberList::new();
        let original = member(5701);
        let moved = Member::new(original.uuid(), "10.0.0.9:5701".parse().unwrap());

        list.add_member(original);
        list.add_member(moved.clone());

        assert_eq!(list.current_members(), vec![moved]);
    }

    #[test]
    fn test_member_list_remove() {
        let list = MemberList::new();
        let a = member(5701);
        let b = member(5702);
        list.set_members(vec![a.clone(), b.clone()]);

        assert_eq!(list.remove_member(a.uuid()), Some(a));
        assert_eq!(list.current_members(), vec![b]);
        assert!(list.remove_member(Uuid::new_v4()).is_none());
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_member_list_broadcasts_events() {
        let list = MemberList::new();
        let mut events = list.subscribe();
        let a = member(5701);

        list.add_member(a.clone());
        list.remove_member(a.uuid());

        let added = events.recv().await.unwrap();
        assert_eq!(added.event_type, MemberEventType::Added);
        assert_eq!(added.member, a);
        let removed = events.recv().await.unwrap();
        assert_eq!(removed.event_type, MemberEventType::Removed);
    }

    #[test]
    fn test_member_list_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemberList>();
    }
}
