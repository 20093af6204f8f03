//! DirTransport - a shared directory acting as the sync substrate.
//!
//! Every device points at the same root directory. A node registers itself
//! by writing `nodes/<id>/node.json`; its items live next to it as
//! MessagePack files. Any other registered node counts as connected.
//!
//! Several processes may act for the same node (two CLI runs, or a
//! write-through racing a publish). Every read-merge-write holds an
//! advisory lock on `nodes/<id>/.lock` and lands through a uniquely named
//! temp file, so concurrent puts never lose each other's fields.
//!
//! ```text
//! <root>/nodes/
//!   ├── 4c8a2f0d/          (phone)
//!   │   ├── node.json
//!   │   └── weather.msgpack
//!   └── 9e11b730/          (watch)
//!       └── node.json
//! ```

use super::{Transport, TransportError};
use async_trait::async_trait;
use pairsync_core::{NodeSet, PutRequest};
use pairsync_types::{DataItem, Document, Node, NodeId, PeerAddress};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const NODE_FILE: &str = "node.json";
const LOCK_FILE: &str = ".lock";

/// DirTransport implements the Transport trait over a shared directory.
///
/// # Example
///
/// ```ignore
/// let transport = DirTransport::new("/mnt/shared/pairsync", Node::new("4c8a2f0d", "phone"));
/// transport.connect().await?;
/// let peers = transport.connected_nodes().await?;
/// ```
pub struct DirTransport {
    /// Root of the shared directory.
    root: PathBuf,
    /// The node this transport registers as.
    local: Node,
}

impl DirTransport {
    /// Create a transport for `local` rooted at `root`. Does not touch the disk.
    pub fn new(root: impl Into<PathBuf>, local: Node) -> Self {
        Self {
            root: root.into(),
            local,
        }
    }

    fn nodes_dir(&self) -> PathBuf {
        self.root.join("nodes")
    }

    fn node_dir(&self, id: &NodeId) -> PathBuf {
        self.nodes_dir().join(id.as_str())
    }

    /// File holding the item at `address`.
    fn item_path(&self, address: &PeerAddress) -> PathBuf {
        let name = address.path().trim_start_matches('/').replace('/', "_");
        let name = if name.is_empty() { "root".to_string() } else { name };
        self.node_dir(address.authority())
            .join(format!("{}.msgpack", name))
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    async fn read_item(&self, address: &PeerAddress) -> Result<Option<Vec<u8>>, TransportError> {
        match tokio::fs::read(self.item_path(address)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }
}

#[async_trait]
impl Transport for DirTransport {
    async fn local_node(&self) -> Result<Node, TransportError> {
        self.ensure_connected()?;
        Ok(self.local.clone())
    }

    async fn connected_nodes(&self) -> Result<NodeSet, TransportError> {
        self.ensure_connected()?;

        let mut entries = tokio::fs::read_dir(self.nodes_dir())
            .await
            .map_err(|e| TransportError::NodeQueryFailed(e.to_string()))?;

        let mut nodes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TransportError::NodeQueryFailed(e.to_string()))?
        {
            let node_file = entry.path().join(NODE_FILE);
            let contents = match tokio::fs::read_to_string(&node_file).await {
                Ok(contents) => contents,
                // Not (yet) a registered node
                Err(_) => continue,
            };
            match serde_json::from_str::<Node>(&contents) {
                // A node may only claim the directory it lives in
                Ok(node) if entry.file_name().to_str() != Some(node.id.as_str()) => {
                    tracing::warn!(
                        "Ignoring {}: id {} does not match its directory",
                        node_file.display(),
                        node.id
                    );
                }
                Ok(node) if node.id != self.local.id => nodes.push(node),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Ignoring malformed {}: {}", node_file.display(), e);
                }
            }
        }

        // read_dir order is platform-dependent; enumeration order must not be
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(NodeSet::new(nodes))
    }

    async fn get_item(&self, address: &PeerAddress) -> Result<Option<DataItem>, TransportError> {
        self.ensure_connected()?;
        Ok(self.read_item(address).await?.map(|data| DataItem {
            address: address.clone(),
            data,
        }))
    }

    async fn put_item(&self, request: PutRequest) -> Result<DataItem, TransportError> {
        self.ensure_connected()?;

        let address = PeerAddress::new(self.local.id.clone(), request.path());
        let node_dir = self.node_dir(&self.local.id);
        let item_file = self.item_path(&address);
        let urgent = request.is_urgent();

        // fd-lock blocks, so the whole cycle runs off the async workers
        let item = tokio::task::spawn_blocking(move || {
            write_merged(&node_dir, &item_file, address, &request)
        })
        .await
        .map_err(|e| TransportError::WriteFailed(e.to_string()))??;

        tracing::debug!(
            "Stored {} ({} bytes, urgent: {})",
            item.address,
            item.data.len(),
            urgent
        );
        Ok(item)
    }

    fn is_connected(&self) -> bool {
        self.node_dir(&self.local.id).join(NODE_FILE).exists()
    }

    async fn connect(&self) -> Result<(), TransportError> {
        let dir = self.node_dir(&self.local.id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let contents = serde_json::to_string_pretty(&self.local)
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        tokio::fs::write(dir.join(NODE_FILE), contents).await?;

        tracing::info!("Registered node {} under {}", self.local.id, self.root.display());
        Ok(())
    }
}

/// Merge `request` into `item_file` while holding the node's lock file.
fn write_merged(
    node_dir: &Path,
    item_file: &Path,
    address: PeerAddress,
    request: &PutRequest,
) -> Result<DataItem, TransportError> {
    let write_failed = |e: std::io::Error| TransportError::WriteFailed(e.to_string());

    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(node_dir.join(LOCK_FILE))
        .map_err(write_failed)?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.write().map_err(write_failed)?;

    let existing = match std::fs::read(item_file) {
        Ok(bytes) => Some(Document::from_bytes(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(TransportError::ReadFailed(e.to_string())),
    };
    let item = DataItem::from_document(address, &request.apply(existing))?;

    // Readers never see a torn item: write a private temp file, then rename
    let mut tmp = NamedTempFile::new_in(node_dir).map_err(write_failed)?;
    tmp.write_all(&item.data).map_err(write_failed)?;
    tmp.persist(item_file)
        .map_err(|e| TransportError::WriteFailed(e.error.to_string()))?;

    Ok(item)
}
