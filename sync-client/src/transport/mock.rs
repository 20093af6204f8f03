//! Mock transport for testing.
//!
//! Keeps items in memory, lets tests script the connected node set, and
//! records reads and puts for verification.

use super::{Transport, TransportError};
use async_trait::async_trait;
use pairsync_core::{NodeSet, PutRequest};
use pairsync_types::{DataItem, Document, Node, NodeId, PeerAddress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Items replicated across every transport sharing the store.
type ItemStore = HashMap<PeerAddress, Vec<u8>>;

/// Mock transport for testing.
///
/// Clones share state. Two transports created with [`MockTransport::pair`]
/// also share one item store, so each sees the other's items instantly.
#[derive(Debug)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
    store: Arc<Mutex<ItemStore>>,
}

#[derive(Debug)]
struct MockTransportInner {
    local: Node,
    connected: bool,
    peers: Vec<Node>,
    connect_attempts: usize,
    reads: Vec<PeerAddress>,
    puts: Vec<PutRequest>,
    fail_next_connect: Option<String>,
    fail_next_nodes: Option<String>,
    fail_next_get: Option<String>,
    fail_next_put: Option<String>,
    hang_next_get: bool,
}

impl MockTransportInner {
    fn new(local: Node) -> Self {
        Self {
            local,
            connected: false,
            peers: Vec::new(),
            connect_attempts: 0,
            reads: Vec::new(),
            puts: Vec::new(),
            fail_next_connect: None,
            fail_next_nodes: None,
            fail_next_get: None,
            fail_next_put: None,
            hang_next_get: false,
        }
    }
}

impl MockTransport {
    /// Create a new disconnected mock transport with a random local node id.
    pub fn new() -> Self {
        Self::with_node(Node::new(NodeId::random(), "local"))
    }

    /// Create a new disconnected mock transport with the given local node id.
    pub fn with_node_id(id: &str) -> Self {
        Self::with_node(Node::new(id, id))
    }

    /// Create a new disconnected mock transport for `local`.
    pub fn with_node(local: Node) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner::new(local))),
            store: Arc::new(Mutex::new(ItemStore::new())),
        }
    }

    /// Create two connected transports that list each other as peers and
    /// share one item store.
    pub fn pair(a: &str, b: &str) -> (Self, Self) {
        let store = Arc::new(Mutex::new(ItemStore::new()));
        let make = |local: &str, peer: &str| {
            let mut inner = MockTransportInner::new(Node::new(local, local));
            inner.connected = true;
            inner.peers.push(Node::new(peer, peer));
            Self {
                inner: Arc::new(Mutex::new(inner)),
                store: Arc::clone(&store),
            }
        };
        (make(a, b), make(b, a))
    }

    /// Id of the local node.
    pub fn local_id(&self) -> NodeId {
        let inner = self.inner.lock().unwrap();
        inner.local.id.clone()
    }

    /// Add a node to the connected set (appended to enumeration order).
    pub fn add_peer(&self, node: Node) {
        let mut inner = self.inner.lock().unwrap();
        inner.peers.push(node);
    }

    /// Remove every connected peer.
    pub fn clear_peers(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.peers.clear();
    }

    /// Store `document` at `address`, as if replicated from its authority.
    pub fn seed(&self, address: PeerAddress, document: &Document) {
        let bytes = document.to_bytes().unwrap();
        let mut store = self.store.lock().unwrap();
        store.insert(address, bytes);
    }

    /// Store raw (possibly undecodable) bytes at `address`.
    pub fn seed_raw(&self, address: PeerAddress, bytes: Vec<u8>) {
        let mut store = self.store.lock().unwrap();
        store.insert(address, bytes);
    }

    /// Decode the document stored at `address`, if any.
    pub fn stored(&self, address: &PeerAddress) -> Option<Document> {
        let store = self.store.lock().unwrap();
        store
            .get(address)
            .map(|bytes| Document::from_bytes(bytes).unwrap())
    }

    /// Decode the local node's document at `path`, if any.
    pub fn local_document(&self, path: &str) -> Option<Document> {
        self.stored(&PeerAddress::new(self.local_id(), path))
    }

    /// Addresses read so far, in order.
    pub fn reads(&self) -> Vec<PeerAddress> {
        let inner = self.inner.lock().unwrap();
        inner.reads.clone()
    }

    /// Put requests received so far, in order.
    pub fn puts(&self) -> Vec<PutRequest> {
        let inner = self.inner.lock().unwrap();
        inner.puts.clone()
    }

    /// Number of times connect() was called.
    pub fn connect_attempts(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.connect_attempts
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next connected_nodes() to fail with the given error.
    pub fn fail_next_nodes(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_nodes = Some(error.to_string());
    }

    /// Cause the next get_item() to fail with the given error.
    pub fn fail_next_get(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_get = Some(error.to_string());
    }

    /// Cause the next put_item() to fail with the given error.
    pub fn fail_next_put(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_put = Some(error.to_string());
    }

    /// Cause the next get_item() to never complete.
    pub fn hang_next_get(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.hang_next_get = true;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            store: Arc::clone(&self.store),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn local_node(&self) -> Result<Node, TransportError> {
        let inner = self.inner.lock().unwrap();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        Ok(inner.local.clone())
    }

    async fn connected_nodes(&self) -> Result<NodeSet, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_nodes.take() {
            return Err(TransportError::NodeQueryFailed(error));
        }

        Ok(NodeSet::new(inner.peers.clone()))
    }

    async fn get_item(&self, address: &PeerAddress) -> Result<Option<DataItem>, TransportError> {
        let hang = {
            let mut inner = self.inner.lock().unwrap();

            if !inner.connected {
                return Err(TransportError::NotConnected);
            }

            // Check for forced failure
            if let Some(error) = inner.fail_next_get.take() {
                return Err(TransportError::ReadFailed(error));
            }

            inner.reads.push(address.clone());
            std::mem::take(&mut inner.hang_next_get)
        };

        if hang {
            std::future::pending::<()>().await;
        }

        let store = self.store.lock().unwrap();
        Ok(store.get(address).map(|data| DataItem {
            address: address.clone(),
            data: data.clone(),
        }))
    }

    async fn put_item(&self, request: PutRequest) -> Result<DataItem, TransportError> {
        let local = {
            let mut inner = self.inner.lock().unwrap();

            if !inner.connected {
                return Err(TransportError::NotConnected);
            }

            // Check for forced failure
            if let Some(error) = inner.fail_next_put.take() {
                return Err(TransportError::WriteFailed(error));
            }

            inner.puts.push(request.clone());
            inner.local.id.clone()
        };

        let address = PeerAddress::new(local, request.path());
        let mut store = self.store.lock().unwrap();
        let existing = match store.get(&address) {
            Some(bytes) => Some(Document::from_bytes(bytes)?),
            None => None,
        };
        let item = DataItem::from_document(address.clone(), &request.apply(existing))?;
        store.insert(address, item.data.clone());
        Ok(item)
    }

    fn is_connected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.connected
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_attempts += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.connected = true;
        Ok(())
    }
}
