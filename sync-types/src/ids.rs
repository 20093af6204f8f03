//! Node identity types for pairsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a device endpoint in the sync substrate.
///
/// Opaque to pairsync. Identifiers can change across reconnects, so they are
/// looked up per operation and never cached.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a substrate-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random NodeId (4 random bytes, hex encoded).
    pub fn random() -> Self {
        let mut bytes = [0u8; 4];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(hex::encode(bytes))
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier can be used as an address authority.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A peer as reported by the sync substrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Substrate-assigned identifier.
    pub id: NodeId,
    /// Human-readable device name.
    pub display_name: String,
    /// Whether the peer is directly reachable (not via a cloud hop).
    pub nearby: bool,
}

impl Node {
    /// Create a nearby node with the given id and display name.
    pub fn new(id: impl Into<NodeId>, display_name: &str) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.to_string(),
            nearby: true,
        }
    }

    /// Set the nearby flag.
    pub fn with_nearby(mut self, nearby: bool) -> Self {
        self.nearby = nearby;
        self
    }

    /// A node is usable as a sync target only if it carries an identifier.
    pub fn is_usable(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_node_id_is_hex() {
        let id = NodeId::random();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn random_node_ids_differ() {
        assert_ne!(NodeId::random(), NodeId::random());
    }

    #[test]
    fn node_id_display_is_raw() {
        let id = NodeId::new("4c8a2f0d");
        assert_eq!(id.to_string(), "4c8a2f0d");
        assert_eq!(format!("{:?}", id), "NodeId(4c8a2f0d)");
    }

    #[test]
    fn node_without_id_is_unusable() {
        assert!(!Node::new("", "ghost").is_usable());
        assert!(Node::new("n1", "watch").is_usable());
    }

    #[test]
    fn node_serializes_as_json() {
        let node = Node::new("n1", "Pixel Watch").with_nearby(false);
        let json = serde_json::to_string(&node).unwrap();
        let restored: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, node);
        assert!(json.contains("\"id\":\"n1\""));
    }
}
