//! Transport abstraction for pairsync.
//!
//! This module provides a pluggable boundary to the sync substrate: the
//! service that discovers peers and replicates per-node items between them.
//! pairsync treats it as a black-box eventually-consistent key-value store.
//!
//! # Design
//!
//! The transport trait is async and item-oriented:
//! - `local_node()` / `connected_nodes()` answer "who is out there"
//! - `get_item()` reads the item stored at a node-scoped address
//! - `put_item()` merges a document into the local node's item
//! - `connect()` / `is_connected()` expose the session state
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::with_node_id("phone");
//! transport.connect().await?;
//! let nodes = transport.connected_nodes().await?;
//! let item = transport.get_item(&PeerAddress::weather(NodeId::new("phone"))).await?;
//! ```

mod dir;
mod mock;

pub use dir::DirTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use pairsync_core::{NodeSet, PutRequest};
use pairsync_types::{DataItem, Node, PeerAddress, SyncError};
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Node discovery failed.
    #[error("node query failed: {0}")]
    NodeQueryFailed(String),

    /// Item read failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Item write failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Stored item could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] SyncError),

    /// Underlying storage I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport trait for reaching the sync substrate.
///
/// Implementations handle peer discovery and item replication
/// (wearable data layer, shared directory, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Describe the node this transport runs on.
    async fn local_node(&self) -> Result<Node, TransportError>;

    /// Snapshot of the currently connected remote nodes. May be empty.
    async fn connected_nodes(&self) -> Result<NodeSet, TransportError>;

    /// Read the item stored at `address`.
    ///
    /// `Ok(None)` means the read succeeded and no item exists.
    async fn get_item(&self, address: &PeerAddress) -> Result<Option<DataItem>, TransportError>;

    /// Merge `request` into the local node's item at `request.path()`.
    ///
    /// The read-merge-write must be atomic with respect to other puts on
    /// the same transport. Returns the stored item.
    async fn put_item(&self, request: PutRequest) -> Result<DataItem, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Connect to the substrate.
    async fn connect(&self) -> Result<(), TransportError>;
}
