//! Global configuration constants for facetstore.
//!
//! Tuning parameters, validation limits, and the document field layout the
//! adapter writes are defined here. These are compile-time constants; the
//! backend handle and index name are runtime state on the store itself.

/// Default number of results returned by a query when the caller does not
/// specify a count.
pub const DEFAULT_QUERY_COUNT: usize = 5;

/// Upper bound on the enumeration search used by `load_entries`.
///
/// Enumeration is a capped relevance search, not a true full scan: an index
/// holding more entries than this returns a truncated set, never an error.
pub const ENUMERATION_CAP: usize = 10_000;

/// Maximum length of an index name in characters.
pub const MAX_INDEX_NAME_LEN: usize = 128;

/// Maximum length of a namespace tag in characters.
pub const MAX_NAMESPACE_LEN: usize = 256;

/// The designated tensor field: its content is embedded by the backend and
/// made similarity-searchable.
pub const TENSOR_FIELD: &str = "content";

/// Non-tensor field holding caller metadata, serialized to a JSON string.
pub const FIELD_META: &str = "meta";

/// Non-tensor field holding the namespace tag used for filter predicates.
pub const FIELD_NAMESPACE: &str = "namespace";

/// Non-tensor field holding the full transportable serialization of an
/// upserted record, kept for later reconstruction.
pub const FIELD_RECORD: &str = "record";

/// Key under which a hit's document id is carried in query-result metadata.
pub const FIELD_ID: &str = "_id";

/// Embedding dimension used by the in-process reference backend.
pub const MEMORY_EMBEDDING_DIM: usize = 8;
