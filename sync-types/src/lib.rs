//! # sync-types
//!
//! Data types for pairsync, the paired-device configuration sync protocol.
//!
//! This crate provides the foundational types used across all pairsync crates:
//! - [`NodeId`], [`Node`] - Peer identity as reported by the sync substrate
//! - [`PeerAddress`] - Node-scoped address of a shared item
//! - [`Document`], [`Value`] - The shared key-value payload
//! - [`WeatherInfo`] - Typed view over the known weather fields
//! - [`DataItem`] - An encoded document stored at an address
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod document;
mod error;
mod ids;
mod item;

pub use address::{PeerAddress, SCHEME, WEATHER_PATH};
pub use document::{Document, Value, WeatherInfo, KEY_HIGH_TEMP, KEY_LOW_TEMP, KEY_WEATHER_ID};
pub use error::SyncError;
pub use ids::{Node, NodeId};
pub use item::DataItem;
