//! Merge-publish requests.
//!
//! A publish never replaces the shared document wholesale. The transport
//! applies [`PutRequest::apply`] atomically against whatever is stored at the
//! request path, so concurrent publishers converge field by field
//! (last write wins per key).

use pairsync_types::{Document, WeatherInfo, WEATHER_PATH};

/// A write of `document` merged onto the item at `path` on the local node.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    path: String,
    document: Document,
    urgent: bool,
}

impl PutRequest {
    /// Create a default-priority merge request for `path`.
    pub fn new(path: &str, document: Document) -> Self {
        Self {
            path: path.to_string(),
            document,
            urgent: false,
        }
    }

    /// Urgent merge request for the weather document.
    pub fn weather(info: WeatherInfo) -> Self {
        Self::new(WEATHER_PATH, info.to_document()).with_urgent(true)
    }

    /// Request expedited propagation ahead of default-priority traffic.
    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Target path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fields to write.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Whether the request is marked urgent.
    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    /// Compute the stored document after this request lands on `existing`.
    pub fn apply(&self, existing: Option<Document>) -> Document {
        let mut merged = existing.unwrap_or_default();
        merged.merge(&self.document);
        merged
    }
}
