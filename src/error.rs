//! Error types for the adapter and its backend seam.
//!
//! The found/absent distinction on fetch paths is *not* an error: those
//! methods return `Ok(None)`. Everything here represents a genuine failure.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by [`FacetStore`](crate::store::FacetStore) and
/// [`IndexBackend`](crate::backend::IndexBackend) implementations.
///
/// Backend failures are propagated unmodified in `Backend`; no retry or
/// translation happens inside the adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend family cannot perform this operation at all. Callers
    /// hitting this need to branch to a different backend, so it must be
    /// raised rather than silently degraded.
    #[error("operation not supported by this backend: {0}")]
    NotSupported(&'static str),

    /// An index with this name already exists. The bootstrap path treats
    /// this as success when racing another client; it is an error everywhere
    /// else.
    #[error("index '{0}' already exists")]
    IndexExists(String),

    /// The index name failed validation (empty, too long, or bad charset).
    #[error("invalid index name: {0}")]
    InvalidName(String),

    /// The namespace failed validation. Namespaces are restricted to
    /// `[A-Za-z0-9._-]` so filter expressions built from them are safe to
    /// interpolate.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Metadata or record serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other failure reported by the remote client (connection,
    /// validation, quota).
    #[error("backend error: {0}")]
    Backend(String),
}
