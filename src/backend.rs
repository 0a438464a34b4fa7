//! The remote-index-client seam and its wire-shaped data transfer objects.
//!
//! A backend in this family is a generic document store with a tensor /
//! non-tensor field split declared at write time, facet-based embedding
//! storage, and a `field:value` filter syntax. The adapter never talks to a
//! service directly; it goes through [`IndexBackend`], so transports (HTTP
//! client, in-process store, test double) are interchangeable.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Document fields: arbitrary JSON values keyed by field name.
pub type FieldMap = HashMap<String, serde_json::Value>;

/// Backend-specific index creation options, passed through verbatim.
pub type IndexSettings = HashMap<String, serde_json::Value>;

/// A document submitted for writing.
///
/// With no `id`, the backend assigns one and reports it back in the item
/// status. Tensor / non-tensor classification is *not* part of the payload;
/// it is supplied per write call, and getting it wrong silently changes
/// whether a field is searchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub id: Option<String>,
    pub fields: FieldMap,
}

impl DocumentPayload {
    /// Creates an empty payload with a caller-chosen id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: FieldMap::new(),
        }
    }

    /// Sets a field, builder-style.
    pub fn field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// One embedding instance attached to a document. A document has one facet
/// per tensor field the backend embedded; a document whose tensor fields
/// were never populated has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorFacet {
    /// The field this facet was embedded from.
    pub field: String,
    pub embedding: Vec<f32>,
}

/// A document as returned by fetch calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    /// Batch fetches report per-id existence instead of erroring.
    pub found: bool,
    pub fields: FieldMap,
    /// Populated only when the fetch asked for facets to be exposed.
    pub facets: Vec<TensorFacet>,
}

/// Per-document status from a write call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedDocument {
    /// The backend-confirmed id, which is the submitted id when one was
    /// given.
    pub id: String,
}

/// Response from [`IndexBackend::add_documents`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentsResponse {
    pub items: Vec<AddedDocument>,
}

/// A relevance search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text. Empty matches every document (used for enumeration).
    pub query: String,
    pub limit: usize,
    /// Fields to retrieve per hit. `None` retrieves every stored field; an
    /// empty list retrieves none (hits still carry their id).
    pub attributes: Option<Vec<String>>,
    /// Filter expression in the backend's `field:value` syntax.
    pub filter: Option<String>,
    /// Backend-specific tuning options, passed through verbatim.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One search hit, in the backend's relevance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    /// Backend-defined scale, higher is better.
    pub score: f32,
    /// Retrieved fields per the request's attribute selection.
    pub fields: FieldMap,
}

/// Response from [`IndexBackend::search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

/// The remote index client the adapter drives.
///
/// Every method is one synchronous request/response exchange. Implementations
/// surface their failures as [`StoreError::Backend`](crate::StoreError),
/// except index-creation conflicts which must map to
/// [`StoreError::IndexExists`](crate::StoreError) so the bootstrap path can
/// recognize them.
pub trait IndexBackend {
    /// Names of all indexes the backend currently holds.
    fn list_indexes(&self) -> Result<Vec<String>>;

    /// Creates an index. Fails with `IndexExists` if the name is taken.
    fn create_index(&self, name: &str, settings: &IndexSettings) -> Result<()>;

    /// Deletes an index and everything in it.
    fn delete_index(&self, name: &str) -> Result<()>;

    /// Writes documents, replacing any existing document with the same id.
    ///
    /// `non_tensor_fields` names the fields to store verbatim; every other
    /// field is embedded. The response carries one item status per submitted
    /// document, in order.
    fn add_documents(
        &self,
        index: &str,
        documents: &[DocumentPayload],
        non_tensor_fields: &[&str],
    ) -> Result<AddDocumentsResponse>;

    /// Fetches one document by id, or `None` if absent.
    fn get_document(
        &self,
        index: &str,
        id: &str,
        expose_facets: bool,
    ) -> Result<Option<RetrievedDocument>>;

    /// Batch-fetches documents by id. Missing ids come back with
    /// `found == false` rather than being omitted or erroring.
    fn get_documents(
        &self,
        index: &str,
        ids: &[String],
        expose_facets: bool,
    ) -> Result<Vec<RetrievedDocument>>;

    /// Runs a relevance search.
    fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse>;
}
