//! # sync-client
//!
//! Client library for pairsync, the paired-device configuration sync protocol.
//!
//! This is the main library that applications use to read and publish the
//! shared weather document.
//!
//! ## Features
//!
//! - **Peer Resolution**: reads from the connected peer, or the local mirror when alone
//! - **Write-Through**: a document fetched from a peer is copied into the local mirror
//! - **Merge-Publish**: updates overwrite matching fields and keep the rest
//! - **Transport Abstraction**: Pluggable sync substrate (directory, mock)
//! - **Pure State Machine**: Uses sync-core for side-effect-free pipeline logic
//!
//! ## Example
//!
//! ```ignore
//! use pairsync_client::{ConfigSync, MockTransport, WeatherInfo};
//!
//! let sync = ConfigSync::new(MockTransport::new());
//! sync.transport().connect().await?;
//!
//! sync.publish_weather(WeatherInfo::new(800, 24.0, 13.5)).await?;
//! let config = sync.fetch_from_connected_peer().await?;
//!
//! // Continuation style: the callback runs at most once, on a runtime worker.
//! sync.fetch_config(|config| println!("{}", config));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod transport;

pub use client::{ClientError, ConfigSync, SyncOptions};
pub use pairsync_core::{AbandonReason, FetchSource, NodeSet, PeerSelection, PutRequest};
pub use pairsync_types::{DataItem, Document, Node, NodeId, PeerAddress, Value, WeatherInfo};
pub use transport::{DirTransport, MockTransport, Transport, TransportError};
