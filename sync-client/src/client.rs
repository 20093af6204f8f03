//! ConfigSync - the main interface for pairsync.
//!
//! This module provides [`ConfigSync`], the primary API for applications to
//! read and publish the shared weather document.
//!
//! # Architecture
//!
//! ConfigSync uses a pure state machine (from sync-core) for the fetch
//! pipeline and interprets its steps to perform actual I/O via the
//! Transport trait.
//!
//! ```text
//! Application → ConfigSync → Transport → Sync substrate
//!                   ↓
//!              sync-core (pure state machine)
//! ```
//!
//! Two surfaces are offered. The async methods return an explicit
//! `Result`, so callers can tell "absent" from "failed". The continuation
//! methods (`fetch_config`, `submit_weather`, ...) schedule the work and
//! return immediately; failures are only logged and the callback simply
//! never runs. They need an ambient Tokio runtime to schedule on; without
//! one they log a warning and return `None` instead of panicking.
//!
//! # Example
//!
//! ```ignore
//! use pairsync_client::{ConfigSync, MockTransport, SyncOptions, WeatherInfo};
//!
//! let transport = MockTransport::with_node_id("phone");
//! let sync = ConfigSync::new(transport).with_options(
//!     SyncOptions::default().with_fetch_timeout(Duration::from_secs(5)),
//! );
//!
//! sync.publish_weather(WeatherInfo::new(800, 24.0, 13.5)).await?;
//! let config = sync.fetch_from_connected_peer().await?;
//! ```

use pairsync_core::{
    AbandonReason, FetchEvent, FetchOptions, FetchPipeline, FetchSource, FetchStep,
    PeerSelection, PutRequest,
};
use pairsync_types::{DataItem, Document, PeerAddress, WeatherInfo, WEATHER_PATH};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::{Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The fetch ended without a document.
    #[error("fetch abandoned: {0}")]
    Abandoned(#[from] AbandonReason),

    /// The caller-imposed fetch timeout elapsed.
    #[error("operation timed out")]
    Timeout,
}

/// Configuration for ConfigSync.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Path of the shared document.
    pub path: String,
    /// Mark writes as urgent.
    pub urgent: bool,
    /// How to pick among several connected peers.
    pub peer_selection: PeerSelection,
    /// Copy documents fetched from a peer into the local mirror.
    pub write_through: bool,
    /// Give up on a fetch after this long (`None` waits forever).
    pub fetch_timeout: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            path: WEATHER_PATH.to_string(),
            urgent: true,
            peer_selection: PeerSelection::default(),
            write_through: true,
            fetch_timeout: None,
        }
    }
}

impl SyncOptions {
    /// Set the document path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set whether writes are urgent.
    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Set the peer selection rule.
    pub fn with_peer_selection(mut self, selection: PeerSelection) -> Self {
        self.peer_selection = selection;
        self
    }

    /// Enable or disable write-through after a peer fetch.
    pub fn with_write_through(mut self, write_through: bool) -> Self {
        self.write_through = write_through;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            path: self.path.clone(),
            selection: self.peer_selection,
            write_through: self.write_through,
        }
    }
}

/// The main config sync client.
///
/// Holds no mutable state of its own: every operation is a fresh
/// request/response against the shared transport. Cloning is cheap.
pub struct ConfigSync<T: Transport> {
    transport: Arc<T>,
    options: SyncOptions,
}

impl<T: Transport> Clone for ConfigSync<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            options: self.options.clone(),
        }
    }
}

impl<T: Transport + 'static> ConfigSync<T> {
    /// Create a new ConfigSync owning `transport`.
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a new ConfigSync over a transport shared with other users.
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            options: SyncOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ===========================================
    // Fetch
    // ===========================================

    /// Read the local node's own mirror of the document.
    pub async fn fetch_local(&self) -> Result<Document, ClientError> {
        self.fetch(FetchSource::Local).await
    }

    /// Read the document from the connected peer, writing it through to the
    /// local mirror. Falls back to [`ConfigSync::fetch_local`] when no peer
    /// is connected.
    ///
    /// The write-through is a merge like any publish: a later
    /// `fetch_local` returns every field of the fetched document, plus any
    /// field the local mirror held that the peer's copy lacks.
    pub async fn fetch_from_connected_peer(&self) -> Result<Document, ClientError> {
        self.fetch(FetchSource::ConnectedPeer).await
    }

    /// Run one fetch, honoring the configured timeout.
    ///
    /// An absent document yields `Ok` with an empty [`Document`].
    pub async fn fetch(&self, source: FetchSource) -> Result<Document, ClientError> {
        match self.options.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_fetch(source))
                .await
                .map_err(|_| ClientError::Timeout)?,
            None => self.run_fetch(source).await,
        }
    }

    async fn run_fetch(&self, source: FetchSource) -> Result<Document, ClientError> {
        let (mut pipeline, mut step) = FetchPipeline::start(source, self.options.fetch_options());

        loop {
            let event = match step {
                FetchStep::ListConnectedNodes => match self.transport.connected_nodes().await {
                    Ok(nodes) => {
                        debug!("Connected nodes: {}", nodes.len());
                        FetchEvent::NodesListed(nodes)
                    }
                    Err(e) => FetchEvent::Failed(AbandonReason::Transport(e.to_string())),
                },
                FetchStep::ResolveLocalNode => match self.transport.local_node().await {
                    Ok(node) => FetchEvent::LocalNodeResolved(node.id),
                    Err(e) => FetchEvent::Failed(AbandonReason::Transport(e.to_string())),
                },
                FetchStep::ReadItem(address) => self.read(&address).await,
                FetchStep::WriteThrough(document) => match self.put(document).await {
                    Ok(_) => FetchEvent::WriteThroughCompleted,
                    Err(e) => {
                        warn!("Write-through to local mirror failed: {}", e);
                        FetchEvent::WriteThroughFailed(e.to_string())
                    }
                },
                FetchStep::Deliver(document) => return Ok(document),
                FetchStep::Abandon(reason) => {
                    debug!("Fetch abandoned: {}", reason);
                    return Err(reason.into());
                }
                FetchStep::Idle => return Err(AbandonReason::UnexpectedEvent.into()),
            };

            (pipeline, step) = pipeline.on_event(event);
        }
    }

    async fn read(&self, address: &PeerAddress) -> FetchEvent {
        debug!("Reading {}", address);
        match self.transport.get_item(address).await {
            Ok(None) => FetchEvent::ReadCompleted(None),
            Ok(Some(item)) => match item.document() {
                Ok(config) => {
                    debug!("Read {}: {}", address, config);
                    FetchEvent::ReadCompleted(Some(config))
                }
                Err(e) => FetchEvent::Failed(AbandonReason::Decode(e.to_string())),
            },
            Err(e) => FetchEvent::Failed(AbandonReason::Transport(e.to_string())),
        }
    }

    // ===========================================
    // Publish
    // ===========================================

    /// Merge `document` into the shared document.
    ///
    /// Fields in `document` overwrite stored fields of the same name; other
    /// stored fields are kept.
    pub async fn publish_document(&self, document: Document) -> Result<DataItem, ClientError> {
        self.put(document).await
    }

    /// Publish a full weather snapshot.
    ///
    /// If the transport is disconnected, a connect is started in the
    /// background but not awaited; the write races it and may fail with
    /// [`TransportError::NotConnected`].
    pub async fn publish_weather(&self, info: WeatherInfo) -> Result<DataItem, ClientError> {
        self.connect_if_disconnected();

        debug!(
            "Publishing weather /{}/{}/{}",
            info.weather_id, info.high_temp, info.low_temp
        );
        self.put(info.to_document()).await
    }

    async fn put(&self, document: Document) -> Result<DataItem, ClientError> {
        let request = PutRequest::new(&self.options.path, document).with_urgent(self.options.urgent);
        match self.transport.put_item(request).await {
            Ok(item) => {
                debug!("Put {} result status: ok", item.address);
                Ok(item)
            }
            Err(e) => {
                debug!("Put {} result status: {}", self.options.path, e);
                Err(e.into())
            }
        }
    }

    fn connect_if_disconnected(&self) {
        if self.transport.is_connected() {
            return;
        }

        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.connect().await {
                warn!("Background connect failed: {}", e);
            }
        });
    }

    // ===========================================
    // Continuation API
    // ===========================================

    /// Fetch the local mirror and hand it to `callback`.
    ///
    /// Returns immediately. `callback` runs at most once, on a runtime
    /// worker; it does not run if the fetch fails. Returns `None` (and
    /// never runs `callback`) when called outside a Tokio runtime.
    pub fn fetch_config<F>(&self, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Document) + Send + 'static,
    {
        self.spawn_fetch(FetchSource::Local, callback)
    }

    /// Fetch from the connected peer (with local fallback) and hand the
    /// result to `callback`. Same delivery rules as [`ConfigSync::fetch_config`].
    pub fn fetch_config_from_connected_peer<F>(&self, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Document) + Send + 'static,
    {
        self.spawn_fetch(FetchSource::ConnectedPeer, callback)
    }

    fn spawn_fetch<F>(&self, source: FetchSource, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Document) + Send + 'static,
    {
        let sync = self.clone();
        spawn_detached(async move {
            match sync.fetch(source).await {
                Ok(config) => callback(config),
                Err(e) => debug!("Fetch from {:?} produced no config: {}", source, e),
            }
        })
    }

    /// Fire-and-forget form of [`ConfigSync::publish_weather`].
    pub fn submit_weather(
        &self,
        weather_id: i32,
        high_temp: f64,
        low_temp: f64,
    ) -> Option<JoinHandle<()>> {
        let sync = self.clone();
        spawn_detached(async move {
            let _ = sync
                .publish_weather(WeatherInfo::new(weather_id, high_temp, low_temp))
                .await;
        })
    }

    /// Fire-and-forget form of [`ConfigSync::publish_document`].
    pub fn submit_document(&self, document: Document) -> Option<JoinHandle<()>> {
        let sync = self.clone();
        spawn_detached(async move {
            let _ = sync.publish_document(document).await;
        })
    }
}

/// Spawn `task` on the current runtime, or log and drop it if there is none.
fn spawn_detached<Fut>(task: Fut) -> Option<JoinHandle<()>>
where
    Fut: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(task)),
        Err(e) => {
            warn!("No Tokio runtime to schedule on, dropping request: {}", e);
            None
        }
    }
}
