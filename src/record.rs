//! Transportable records: rich text objects that can round-trip through a
//! backend's non-tensor storage as a single string field.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A value the store can upsert as a record.
///
/// The store embeds `body()` as the document's tensor field and stores the
/// full `to_transportable()` serialization alongside it, so the record can be
/// reconstructed from a fetched entry without another source of truth.
/// Implementors own their id; the store never substitutes a generated one.
pub trait Transportable {
    /// Stable identifier, used verbatim as the document id.
    fn record_id(&self) -> &str;

    /// The primary text value, embedded by the backend.
    fn body(&self) -> &str;

    /// Serializes the whole record to a transportable string.
    fn to_transportable(&self) -> Result<String>;
}

/// The standard text record: an id, a text body, and arbitrary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, serde_json::Value>,
}

impl TextRecord {
    /// Creates a record with a random UUID id.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            body: body.into(),
            meta: HashMap::new(),
        }
    }

    /// Creates a record with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            meta: HashMap::new(),
        }
    }

    /// Reconstructs a record from its transportable serialization.
    pub fn from_transportable(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl Transportable for TextRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn to_transportable(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_uuid_id() {
        let a = TextRecord::new("hello");
        let b = TextRecord::new("hello");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_transportable_round_trip() {
        let mut record = TextRecord::with_id("r-1", "some text");
        record
            .meta
            .insert("lang".to_string(), serde_json::json!("en"));

        let raw = record.to_transportable().unwrap();
        let restored = TextRecord::from_transportable(&raw).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_from_transportable_rejects_garbage() {
        assert!(TextRecord::from_transportable("not json").is_err());
    }
}
