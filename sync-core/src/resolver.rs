//! Peer resolution for pairsync.
//!
//! Decides which node holds the authoritative copy of the shared document.
//! The protocol supports at most one remote peer, so a non-empty node set
//! always resolves to exactly one node.

use pairsync_types::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Snapshot of the peers reachable at call time.
///
/// Order is the substrate's enumeration order; [`PeerSelection`] depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    /// Create a snapshot from enumerated nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// An empty snapshot (no peer connected).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of nodes enumerated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no peer is connected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Rule for picking one peer out of a multi-node snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerSelection {
    /// The last node enumerated.
    #[default]
    Last,
    /// The first node enumerated.
    First,
    /// The last nearby node, or the last node if none is nearby.
    PreferNearby,
}

impl FromStr for PeerSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last" => Ok(Self::Last),
            "first" => Ok(Self::First),
            "nearby" | "prefer_nearby" => Ok(Self::PreferNearby),
            other => Err(format!("unknown peer selection: {}", other)),
        }
    }
}

/// Outcome of peer resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No peer connected; use the local node.
    Local,
    /// Use this connected peer.
    Peer(NodeId),
    /// Peers were enumerated but the chosen one has no usable identifier.
    Unresolvable,
}

/// Resolve the sync target from a node snapshot.
pub fn resolve(nodes: &NodeSet, selection: PeerSelection) -> Resolution {
    let chosen = match selection {
        PeerSelection::Last => nodes.nodes.last(),
        PeerSelection::First => nodes.nodes.first(),
        PeerSelection::PreferNearby => nodes
            .nodes
            .iter()
            .rev()
            .find(|n| n.nearby)
            .or_else(|| nodes.nodes.last()),
    };

    match chosen {
        None => Resolution::Local,
        Some(node) if node.is_usable() => Resolution::Peer(node.id.clone()),
        Some(_) => Resolution::Unresolvable,
    }
}
