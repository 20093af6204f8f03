//! # sync-core
//!
//! Pure logic for pairsync (no I/O, instant tests).
//!
//! This crate implements peer resolution, the fetch pipeline and the
//! merge-publish request without any network or disk I/O, enabling fast
//! unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about pipeline transitions
//!
//! The actual I/O (node discovery, item reads and writes) is performed by
//! `sync-client`, which interprets the steps produced by these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fetch;
pub mod publish;
pub mod resolver;

pub use fetch::{AbandonReason, FetchEvent, FetchOptions, FetchPipeline, FetchSource, FetchStep};
pub use publish::PutRequest;
pub use resolver::{resolve, NodeSet, PeerSelection, Resolution};
