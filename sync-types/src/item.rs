//! Items as stored by the sync substrate.

use crate::address::PeerAddress;
use crate::document::Document;
use crate::error::SyncError;

/// An encoded document stored at a [`PeerAddress`].
#[derive(Clone, PartialEq, Eq)]
pub struct DataItem {
    /// Where the item lives.
    pub address: PeerAddress,
    /// MessagePack-encoded [`Document`].
    pub data: Vec<u8>,
}

impl DataItem {
    /// Encode `document` as an item at `address`.
    pub fn from_document(address: PeerAddress, document: &Document) -> Result<Self, SyncError> {
        Ok(Self {
            address,
            data: document.to_bytes()?,
        })
    }

    /// Decode the item body.
    pub fn document(&self) -> Result<Document, SyncError> {
        Document::from_bytes(&self.data)
    }
}

impl std::fmt::Debug for DataItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataItem")
            .field("address", &self.address.to_string())
            .field("data", &format!("[{} bytes]", self.data.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WeatherInfo;
    use crate::ids::NodeId;

    #[test]
    fn item_decodes_its_document() {
        let doc = WeatherInfo::new(200, 75.0, 55.0).to_document();
        let item = DataItem::from_document(PeerAddress::weather(NodeId::new("n1")), &doc).unwrap();
        assert_eq!(item.document().unwrap(), doc);
    }

    #[test]
    fn item_with_corrupt_body_fails_decode() {
        let item = DataItem {
            address: PeerAddress::weather(NodeId::new("n1")),
            data: vec![0xC1],
        };
        assert!(item.document().is_err());
    }

    #[test]
    fn debug_shows_size_not_bytes() {
        let item = DataItem {
            address: PeerAddress::weather(NodeId::new("n1")),
            data: vec![0xDE, 0xAD],
        };
        let debug = format!("{:?}", item);
        assert!(debug.contains("wear://n1/weather"));
        assert!(debug.contains("[2 bytes]"));
    }
}
