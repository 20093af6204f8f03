//! Node-scoped addresses for shared items.

use crate::ids::NodeId;
use std::fmt;

/// URI scheme of the sync substrate.
pub const SCHEME: &str = "wear";

/// Path of the shared weather document.
pub const WEATHER_PATH: &str = "/weather";

/// Identifies a shared item: a fixed path on a specific node.
///
/// Rendered as `wear://<node-id><path>`. Built fresh per operation because
/// node identifiers are not stable across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    authority: NodeId,
    path: String,
}

impl PeerAddress {
    /// Create an address for `path` on the node `authority`.
    pub fn new(authority: NodeId, path: &str) -> Self {
        Self {
            authority,
            path: path.to_string(),
        }
    }

    /// Address of the weather document held by `authority`.
    pub fn weather(authority: NodeId) -> Self {
        Self::new(authority, WEATHER_PATH)
    }

    /// The node holding the item.
    pub fn authority(&self) -> &NodeId {
        &self.authority
    }

    /// The item path (always starts with `/`).
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", SCHEME, self.authority, self.path)
    }
}
