//! Fetch pipeline state machine for pairsync.
//!
//! A fetch runs strictly in sequence: resolve the target node, read the
//! document at its address, optionally write a remote copy through to the
//! local mirror, then deliver. This module models that sequence as a pure
//! state machine: each [`FetchEvent`] produces the next [`FetchStep`] for
//! sync-client to execute.
//!
//! Every run emits at most one [`FetchStep::Deliver`] or
//! [`FetchStep::Abandon`]; once finished, the pipeline only answers
//! [`FetchStep::Idle`].

use crate::resolver::{resolve, NodeSet, PeerSelection, Resolution};
use pairsync_types::{Document, NodeId, PeerAddress, WEATHER_PATH};
use thiserror::Error;

/// Where a fetch reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The local node's own mirror. Never consults the node set.
    Local,
    /// The connected peer, falling back to the local mirror when none is connected.
    ConnectedPeer,
}

/// Tunables for a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Item path to read.
    pub path: String,
    /// How to pick among several connected peers.
    pub selection: PeerSelection,
    /// Copy a document fetched from a remote peer into the local mirror.
    pub write_through: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            path: WEATHER_PATH.to_string(),
            selection: PeerSelection::default(),
            write_through: true,
        }
    }
}

/// Why a fetch ended without delivering a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbandonReason {
    /// The transport reported a failed node query or read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The stored item could not be decoded.
    #[error("undecodable document: {0}")]
    Decode(String),

    /// Peers were enumerated but none could be addressed.
    #[error("no usable node to read from")]
    NoUsableNode,

    /// An event arrived that the current phase does not accept.
    #[error("unexpected pipeline event")]
    UnexpectedEvent,
}

/// Outcomes reported back to the pipeline by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Connected nodes were listed.
    NodesListed(NodeSet),
    /// The local node id was resolved.
    LocalNodeResolved(NodeId),
    /// The read succeeded; `None` means no item exists at the address.
    ReadCompleted(Option<Document>),
    /// The write-through put completed.
    WriteThroughCompleted,
    /// The write-through put failed. Delivery still happens.
    WriteThroughFailed(String),
    /// A node query, read or decode failed.
    Failed(AbandonReason),
}

/// The next thing the executor must do.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStep {
    /// List the connected nodes.
    ListConnectedNodes,
    /// Look up the local node id.
    ResolveLocalNode,
    /// Read the item at this address.
    ReadItem(PeerAddress),
    /// Merge-put this document into the local mirror.
    WriteThrough(Document),
    /// Hand this document to the caller. Terminal.
    Deliver(Document),
    /// Give up without delivering. Terminal.
    Abandon(AbandonReason),
    /// Nothing left to do.
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    ListingPeers,
    ResolvingLocal,
    Reading { remote: bool },
    WritingThrough { document: Document },
    Finished,
}

/// A single fetch run. NO I/O, just phase transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPipeline {
    options: FetchOptions,
    phase: Phase,
}

impl FetchPipeline {
    /// Begin a fetch and return the first step.
    pub fn start(source: FetchSource, options: FetchOptions) -> (Self, FetchStep) {
        let (phase, step) = match source {
            FetchSource::Local => (Phase::ResolvingLocal, FetchStep::ResolveLocalNode),
            FetchSource::ConnectedPeer => (Phase::ListingPeers, FetchStep::ListConnectedNodes),
        };
        (Self { options, phase }, step)
    }

    /// Process an event and return the new pipeline plus the next step.
    ///
    /// This is a pure function - no side effects. The caller (sync-client)
    /// is responsible for executing the returned step.
    pub fn on_event(self, event: FetchEvent) -> (Self, FetchStep) {
        let options = self.options;
        let (phase, step) = match (self.phase, event) {
            (Phase::Finished, _) => (Phase::Finished, FetchStep::Idle),

            (_, FetchEvent::Failed(reason)) => (Phase::Finished, FetchStep::Abandon(reason)),

            // Peer discovery. An empty set falls back to the local mirror once.
            (Phase::ListingPeers, FetchEvent::NodesListed(nodes)) => {
                match resolve(&nodes, options.selection) {
                    Resolution::Local => (Phase::ResolvingLocal, FetchStep::ResolveLocalNode),
                    Resolution::Peer(id) => (
                        Phase::Reading { remote: true },
                        FetchStep::ReadItem(PeerAddress::new(id, &options.path)),
                    ),
                    Resolution::Unresolvable => (
                        Phase::Finished,
                        FetchStep::Abandon(AbandonReason::NoUsableNode),
                    ),
                }
            }

            (Phase::ResolvingLocal, FetchEvent::LocalNodeResolved(id)) if id.is_empty() => (
                Phase::Finished,
                FetchStep::Abandon(AbandonReason::NoUsableNode),
            ),
            (Phase::ResolvingLocal, FetchEvent::LocalNodeResolved(id)) => (
                Phase::Reading { remote: false },
                FetchStep::ReadItem(PeerAddress::new(id, &options.path)),
            ),

            // Absent item is a valid state: deliver an empty document.
            (Phase::Reading { .. }, FetchEvent::ReadCompleted(None)) => {
                (Phase::Finished, FetchStep::Deliver(Document::new()))
            }
            (Phase::Reading { remote: true }, FetchEvent::ReadCompleted(Some(document)))
                if options.write_through =>
            {
                (
                    Phase::WritingThrough {
                        document: document.clone(),
                    },
                    FetchStep::WriteThrough(document),
                )
            }
            (Phase::Reading { .. }, FetchEvent::ReadCompleted(Some(document))) => {
                (Phase::Finished, FetchStep::Deliver(document))
            }

            (
                Phase::WritingThrough { document },
                FetchEvent::WriteThroughCompleted | FetchEvent::WriteThroughFailed(_),
            ) => (Phase::Finished, FetchStep::Deliver(document)),

            // Invalid transitions - finish without delivering
            (_, _) => (
                Phase::Finished,
                FetchStep::Abandon(AbandonReason::UnexpectedEvent),
            ),
        };

        (Self { options, phase }, step)
    }

    /// Check if the run has produced its terminal step.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }
}
