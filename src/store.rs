//! The vector-store adapter: a uniform upsert / load / query contract over
//! an [`IndexBackend`].
//!
//! Every operation is one synchronous request/response exchange (two for the
//! enumerate-then-fetch of `load_entries`, plus one per hit when a query
//! requests vectors). There is no caching, no retry, and no cross-call
//! protocol; deadlines are the caller's responsibility.

use crate::backend::{DocumentPayload, FieldMap, IndexBackend, IndexSettings, RetrievedDocument, SearchRequest};
use crate::config::{
    DEFAULT_QUERY_COUNT, ENUMERATION_CAP, FIELD_ID, FIELD_META, FIELD_NAMESPACE, FIELD_RECORD,
    TENSOR_FIELD,
};
use crate::entry::{Entry, QueryResult};
use crate::error::{Result, StoreError};
use crate::filter;
use crate::record::Transportable;
use std::collections::HashMap;

/// Options for [`FacetStore::query`].
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of results. Defaults to
    /// [`DEFAULT_QUERY_COUNT`](crate::config::DEFAULT_QUERY_COUNT).
    pub count: Option<usize>,
    /// Restrict hits to one namespace via an equality filter predicate.
    pub namespace: Option<String>,
    /// Fetch each hit's embedding. Costs one extra backend round trip per
    /// hit.
    pub include_vectors: bool,
    /// Retrieve all stored fields per hit; when off, hits carry only their
    /// id.
    pub include_metadata: bool,
    /// Backend-specific tuning options, passed through verbatim to the
    /// search call.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            count: None,
            namespace: None,
            include_vectors: false,
            include_metadata: true,
            extra: HashMap::new(),
        }
    }
}

/// Adapter over a tensor-search backend.
///
/// Construction reconciles index existence: after [`connect`](Self::connect)
/// returns, the target index exists in the backend. The store holds one
/// owned backend handle for its lifetime and an index name that only
/// [`set_index`](Self::set_index) mutates; it is not designed for concurrent
/// re-targeting.
#[derive(Debug)]
pub struct FacetStore<B: IndexBackend> {
    backend: B,
    index: String,
}

impl<B: IndexBackend> FacetStore<B> {
    /// Connects to `index`, creating it if absent.
    ///
    /// Idempotent: connecting twice to the same name issues at most one
    /// create call. A create that fails because another client won the race
    /// is treated as success.
    pub fn connect(backend: B, index: impl Into<String>) -> Result<Self> {
        let mut store = Self {
            backend,
            index: String::new(),
        };
        store.set_index(index)?;
        Ok(store)
    }

    /// Re-targets the store to another index, running the same
    /// create-if-absent reconciliation.
    pub fn set_index(&mut self, index: impl Into<String>) -> Result<()> {
        let index = index.into();
        filter::validate_index_name(&index)?;

        let existing = self.backend.list_indexes()?;
        if !existing.iter().any(|name| *name == index) {
            match self.backend.create_index(&index, &IndexSettings::new()) {
                Ok(()) => tracing::info!("created index '{}'", index),
                // Lost a concurrent bootstrap race; the index exists, which
                // is all this path guarantees.
                Err(StoreError::IndexExists(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.index = index;
        Ok(())
    }

    /// The index this store currently targets.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The underlying backend handle.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Upserts one text document.
    ///
    /// `text` becomes the tensor field; `meta` is serialized to a JSON
    /// string and stored non-tensor; `namespace` (validated) is stored
    /// non-tensor. Returns the backend-confirmed id, which differs from the
    /// request only when no id was supplied.
    pub fn upsert_text(
        &self,
        text: &str,
        id: Option<String>,
        namespace: Option<&str>,
        meta: Option<&FieldMap>,
    ) -> Result<String> {
        let mut doc = DocumentPayload {
            id,
            fields: FieldMap::new(),
        };
        doc.fields
            .insert(TENSOR_FIELD.to_string(), serde_json::Value::String(text.to_string()));
        if let Some(meta) = meta {
            doc.fields.insert(
                FIELD_META.to_string(),
                serde_json::Value::String(serde_json::to_string(meta)?),
            );
        }
        if let Some(namespace) = namespace {
            filter::validate_namespace(namespace)?;
            doc.fields.insert(
                FIELD_NAMESPACE.to_string(),
                serde_json::Value::String(namespace.to_string()),
            );
        }

        let response =
            self.backend
                .add_documents(&self.index, &[doc], &[FIELD_META, FIELD_NAMESPACE])?;
        let id = confirmed_id(&response.items)?;
        tracing::debug!("upserted text document '{}' into '{}'", id, self.index);
        Ok(id)
    }

    /// Upserts a transportable record.
    ///
    /// The record's body becomes the tensor field and the full serialization
    /// is stored non-tensor for later reconstruction. Unlike
    /// [`upsert_text`](Self::upsert_text), the record's own id is always
    /// used, never backend-generated.
    pub fn upsert_record<R: Transportable>(
        &self,
        record: &R,
        namespace: Option<&str>,
        meta: Option<&FieldMap>,
    ) -> Result<String> {
        let mut doc = DocumentPayload::with_id(record.record_id());
        doc.fields.insert(
            TENSOR_FIELD.to_string(),
            serde_json::Value::String(record.body().to_string()),
        );
        doc.fields.insert(
            FIELD_RECORD.to_string(),
            serde_json::Value::String(record.to_transportable()?),
        );
        if let Some(meta) = meta {
            doc.fields.insert(
                FIELD_META.to_string(),
                serde_json::Value::String(serde_json::to_string(meta)?),
            );
        }
        if let Some(namespace) = namespace {
            filter::validate_namespace(namespace)?;
            doc.fields.insert(
                FIELD_NAMESPACE.to_string(),
                serde_json::Value::String(namespace.to_string()),
            );
        }

        let response = self.backend.add_documents(
            &self.index,
            &[doc],
            &[FIELD_META, FIELD_NAMESPACE, FIELD_RECORD],
        )?;
        let id = confirmed_id(&response.items)?;
        tracing::debug!("upserted record '{}' into '{}'", id, self.index);
        Ok(id)
    }

    /// Always fails: this backend family embeds text server-side and cannot
    /// accept a precomputed vector for a tensor field. Callers needing raw
    /// vector insertion must branch to a different backend; no write is
    /// attempted.
    pub fn upsert_vector(
        &self,
        _vector: &[f32],
        _id: Option<String>,
        _namespace: Option<&str>,
        _meta: Option<&FieldMap>,
    ) -> Result<String> {
        Err(StoreError::NotSupported(
            "tensor backends embed text server-side; raw vectors cannot be upserted",
        ))
    }

    /// Loads one entry by id.
    ///
    /// Returns `Ok(None)` both when the document is absent and when it
    /// exists with zero facets: a document whose tensor field was never
    /// populated is indistinguishable from "not found" for retrieval
    /// purposes. `namespace` is accepted for interface symmetry; lookup is
    /// by id alone.
    pub fn load_entry(&self, id: &str, _namespace: Option<&str>) -> Result<Option<Entry>> {
        let Some(doc) = self.backend.get_document(&self.index, id, true)? else {
            return Ok(None);
        };
        if doc.facets.is_empty() {
            return Ok(None);
        }
        Ok(Some(entry_from_document(doc)))
    }

    /// Loads all entries, optionally restricted to one namespace.
    ///
    /// Two-phase: an empty-query enumeration search capped at
    /// [`ENUMERATION_CAP`](crate::config::ENUMERATION_CAP), then a batch
    /// facet-exposing fetch. Not a true full scan: an over-cap index
    /// truncates. Entries deleted between the two phases are silently
    /// dropped, as are facet-less documents.
    pub fn load_entries(&self, namespace: Option<&str>) -> Result<Vec<Entry>> {
        let request = SearchRequest {
            query: String::new(),
            limit: ENUMERATION_CAP,
            attributes: None,
            filter: namespace.map(filter::namespace_filter).transpose()?,
            extra: HashMap::new(),
        };
        let response = self.backend.search(&self.index, &request)?;
        if response.hits.len() >= ENUMERATION_CAP {
            tracing::warn!(
                "enumeration of '{}' hit the {} cap; results are truncated",
                self.index,
                ENUMERATION_CAP
            );
        }

        let ids: Vec<String> = response.hits.into_iter().map(|hit| hit.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.backend.get_documents(&self.index, &ids, true)?;
        Ok(documents
            .into_iter()
            .filter(|doc| doc.found && !doc.facets.is_empty())
            .map(entry_from_document)
            .collect())
    }

    /// Runs a relevance search.
    ///
    /// Results keep the backend's relevance order with scores unmodified.
    /// With `include_vectors`, each hit costs one extra fetch to populate
    /// its embedding (first facet).
    pub fn query(&self, text: &str, options: &QueryOptions) -> Result<Vec<QueryResult>> {
        let request = SearchRequest {
            query: text.to_string(),
            limit: options.count.unwrap_or(DEFAULT_QUERY_COUNT),
            attributes: if options.include_metadata {
                None
            } else {
                Some(Vec::new())
            },
            filter: options
                .namespace
                .as_deref()
                .map(filter::namespace_filter)
                .transpose()?,
            extra: options.extra.clone(),
        };
        let response = self.backend.search(&self.index, &request)?;
        tracing::debug!(
            "query against '{}' returned {} hits",
            self.index,
            response.hits.len()
        );

        let mut results = Vec::with_capacity(response.hits.len());
        for hit in response.hits {
            let vector = if options.include_vectors {
                self.backend
                    .get_document(&self.index, &hit.id, true)?
                    .and_then(|doc| doc.facets.into_iter().next())
                    .map(|facet| facet.embedding)
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            let mut meta = hit.fields;
            meta.insert(FIELD_ID.to_string(), serde_json::Value::String(hit.id));
            results.push(QueryResult {
                vector,
                score: hit.score,
                meta,
            });
        }
        Ok(results)
    }

    /// Creates an index. Thin pass-through; backend errors surface directly.
    pub fn create_index(&self, name: &str, settings: &IndexSettings) -> Result<()> {
        self.backend.create_index(name, settings)?;
        tracing::info!("created index '{}'", name);
        Ok(())
    }

    /// Deletes an index. Thin pass-through; backend errors surface directly.
    pub fn delete_index(&self, name: &str) -> Result<()> {
        self.backend.delete_index(name)?;
        tracing::info!("deleted index '{}'", name);
        Ok(())
    }

    /// Names of all indexes in the backend.
    pub fn list_indexes(&self) -> Result<Vec<String>> {
        self.backend.list_indexes()
    }
}

/// First item's backend-confirmed id from a write response.
fn confirmed_id(items: &[crate::backend::AddedDocument]) -> Result<String> {
    items
        .first()
        .map(|item| item.id.clone())
        .ok_or_else(|| StoreError::Backend("write returned no item status".to_string()))
}

fn entry_from_document(doc: RetrievedDocument) -> Entry {
    // First facet only; multi-facet documents are not fully represented.
    let vector = doc
        .facets
        .first()
        .map(|facet| facet.embedding.clone())
        .unwrap_or_default();
    let namespace = doc
        .fields
        .get(FIELD_NAMESPACE)
        .and_then(|value| value.as_str())
        .map(str::to_owned);
    Entry {
        id: doc.id,
        vector,
        meta: doc.fields,
        namespace,
    }
}
