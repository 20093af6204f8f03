//! The shared key-value document.
//!
//! A [`Document`] is an open, ordered string → scalar map. The weather fields
//! are a convention on top of it ([`WeatherInfo`]), not a fixed schema, so
//! partial updates and unknown fields survive a merge.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key of the weather condition id (integer).
pub const KEY_WEATHER_ID: &str = "weatherId";

/// Key of the forecast high temperature (double).
pub const KEY_HIGH_TEMP: &str = "highTemp";

/// Key of the forecast low temperature (double).
pub const KEY_LOW_TEMP: &str = "lowTemp";

/// A typed scalar stored in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{:?}", v),
        }
    }
}

/// The shared configuration payload.
///
/// An empty document is a legitimate value: it is what a fetch yields when
/// nothing has been published yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    entries: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get an integer field. Returns `None` if absent or not an integer.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a floating point field. Returns `None` if absent or not a double.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(Value::Double(v)) => Some(*v),
            _ => None,
        }
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Set an integer field.
    pub fn put_int(&mut self, key: &str, value: i64) {
        self.insert(key, Value::Int(value));
    }

    /// Set a floating point field.
    pub fn put_double(&mut self, key: &str, value: f64) {
        self.insert(key, Value::Double(value));
    }

    /// Builder form of [`Document::put_int`].
    pub fn with_int(mut self, key: &str, value: i64) -> Self {
        self.put_int(key, value);
        self
    }

    /// Builder form of [`Document::put_double`].
    pub fn with_double(mut self, key: &str, value: f64) -> Self {
        self.put_double(key, value);
        self
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every field of `update` into this document.
    ///
    /// Fields present in `update` overwrite fields of the same name; fields
    /// absent from `update` are left untouched.
    pub fn merge(&mut self, update: &Document) {
        for (key, value) in &update.entries {
            self.entries.insert(key.clone(), *value);
        }
    }

    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SyncError> {
        rmp_serde::to_vec(self).map_err(SyncError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SyncError> {
        rmp_serde::from_slice(bytes).map_err(SyncError::Deserialization)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

/// Typed view over the weather fields of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherInfo {
    /// Weather condition id.
    pub weather_id: i32,
    /// Forecast high temperature.
    pub high_temp: f64,
    /// Forecast low temperature.
    pub low_temp: f64,
}

impl WeatherInfo {
    /// Create a weather snapshot.
    pub fn new(weather_id: i32, high_temp: f64, low_temp: f64) -> Self {
        Self {
            weather_id,
            high_temp,
            low_temp,
        }
    }

    /// Build a fresh document holding exactly the three weather fields.
    pub fn to_document(&self) -> Document {
        Document::new()
            .with_int(KEY_WEATHER_ID, i64::from(self.weather_id))
            .with_double(KEY_HIGH_TEMP, self.high_temp)
            .with_double(KEY_LOW_TEMP, self.low_temp)
    }

    /// Read the weather fields back out of a document.
    ///
    /// Returns `None` unless all three fields are present with the right types.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let weather_id = i32::try_from(doc.get_int(KEY_WEATHER_ID)?).ok()?;
        Some(Self {
            weather_id,
            high_temp: doc.get_double(KEY_HIGH_TEMP)?,
            low_temp: doc.get_double(KEY_LOW_TEMP)?,
        })
    }
}

impl From<WeatherInfo> for Document {
    fn from(info: WeatherInfo) -> Self {
        info.to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_state() -> Document {
        Document::new()
            .with_int(KEY_WEATHER_ID, 1)
            .with_double(KEY_HIGH_TEMP, 80.0)
            .with_double(KEY_LOW_TEMP, 60.0)
    }

    // ===========================================
    // Accessor Tests
    // ===========================================

    #[test]
    fn new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
        assert_eq!(doc.to_string(), "{}");
    }

    #[test]
    fn typed_getters_check_type() {
        let doc = shared_state();
        assert_eq!(doc.get_int(KEY_WEATHER_ID), Some(1));
        assert_eq!(doc.get_double(KEY_WEATHER_ID), None);
        assert_eq!(doc.get_double(KEY_HIGH_TEMP), Some(80.0));
        assert_eq!(doc.get_int(KEY_HIGH_TEMP), None);
        assert_eq!(doc.get_int("missing"), None);
    }

    #[test]
    fn display_is_key_ordered() {
        assert_eq!(
            shared_state().to_string(),
            "{highTemp=80.0, lowTemp=60.0, weatherId=1}"
        );
    }

    // ===========================================
    // Merge Tests
    // ===========================================

    #[test]
    fn merge_preserves_untouched_fields() {
        let mut doc = shared_state();
        doc.merge(&Document::new().with_double(KEY_HIGH_TEMP, 85.0));

        assert_eq!(doc.get_int(KEY_WEATHER_ID), Some(1));
        assert_eq!(doc.get_double(KEY_HIGH_TEMP), Some(85.0));
        assert_eq!(doc.get_double(KEY_LOW_TEMP), Some(60.0));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn merge_is_idempotent() {
        let update = WeatherInfo::new(500, 70.5, 50.25).to_document();

        let mut once = shared_state();
        once.merge(&update);

        let mut twice = shared_state();
        twice.merge(&update);
        twice.merge(&update);

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_keeps_unknown_fields() {
        let mut doc = shared_state().with_int("humidity", 40);
        doc.merge(&WeatherInfo::new(2, 1.0, 0.0).to_document());
        assert_eq!(doc.get_int("humidity"), Some(40));
    }

    #[test]
    fn merge_can_change_value_type() {
        let mut doc = shared_state();
        doc.merge(&Document::new().with_int(KEY_HIGH_TEMP, 85));
        assert_eq!(doc.get_int(KEY_HIGH_TEMP), Some(85));
    }

    // ===========================================
    // Encoding Tests
    // ===========================================

    #[test]
    fn msgpack_keeps_value_types() {
        let doc = shared_state();
        let restored = Document::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, doc);
        assert_eq!(restored.get(KEY_HIGH_TEMP), Some(&Value::Double(80.0)));
        assert_eq!(restored.get(KEY_WEATHER_ID), Some(&Value::Int(1)));
    }

    #[test]
    fn json_shape_is_flat_map() {
        let json = serde_json::to_string(&shared_state()).unwrap();
        assert_eq!(json, r#"{"highTemp":80.0,"lowTemp":60.0,"weatherId":1}"#);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = Document::from_bytes(&[0xC1, 0x00, 0xFF]);
        assert!(matches!(result, Err(SyncError::Deserialization(_))));
    }

    // ===========================================
    // WeatherInfo Tests
    // ===========================================

    #[test]
    fn weather_info_document_has_three_fields() {
        let doc = WeatherInfo::new(200, 75.0, 55.0).to_document();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_int(KEY_WEATHER_ID), Some(200));
        assert_eq!(doc.get_double(KEY_HIGH_TEMP), Some(75.0));
        assert_eq!(doc.get_double(KEY_LOW_TEMP), Some(55.0));
    }

    #[test]
    fn weather_info_from_partial_document_is_none() {
        let doc = Document::new().with_double(KEY_HIGH_TEMP, 85.0);
        assert!(WeatherInfo::from_document(&doc).is_none());
    }

    #[test]
    fn weather_info_rejects_out_of_range_id() {
        let doc = WeatherInfo::new(1, 2.0, 3.0)
            .to_document()
            .with_int(KEY_WEATHER_ID, i64::MAX);
        assert!(WeatherInfo::from_document(&doc).is_none());
    }

    #[test]
    fn weather_info_reads_back() {
        let info = WeatherInfo::new(800, 21.5, 12.0);
        assert_eq!(WeatherInfo::from_document(&info.into()), Some(info));
    }
}
