//! Shared container types for stored items and search hits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stored item as surfaced to callers.
///
/// Entries are created by upsert calls and replaced whole by re-upsert with
/// the same id. The `vector` is the first tensor facet's embedding only;
/// documents carrying multiple facets are not fully represented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique within the owning index. Backend-assigned unless the caller
    /// supplied one.
    pub id: String,
    /// Embedding of the first tensor facet. Empty when the document was
    /// fetched without facets exposed.
    pub vector: Vec<f32>,
    /// All stored fields except backend bookkeeping. Caller metadata lives
    /// here as a serialized JSON string under the `meta` field.
    pub meta: HashMap<String, serde_json::Value>,
    /// Soft partition tag, if the document carries one.
    pub namespace: Option<String>,
}

/// An ephemeral view of one search hit. Constructed fresh per query, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Empty unless the query requested vectors; retrieval costs one extra
    /// backend fetch per hit.
    pub vector: Vec<f32>,
    /// Relevance score on the backend's own scale, higher is better.
    pub score: f32,
    /// All other returned fields. The document id rides here under `"_id"`.
    pub meta: HashMap<String, serde_json::Value>,
}
