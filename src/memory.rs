//! In-process reference implementation of [`IndexBackend`].
//!
//! Used by the test suite and as a development stand-in for a hosted
//! tensor-search service. Embeddings are deterministic token-hash vectors and
//! relevance is query-token overlap. No ML, but the same observable
//! semantics the adapter relies on: tensor/non-tensor classification at write
//! time, facet storage, `field:value` filters, and empty-query enumeration.
//!
//! Cloning a `MemoryBackend` produces a new handle to the same shared state.

use crate::backend::{
    AddDocumentsResponse, AddedDocument, DocumentPayload, FieldMap, IndexBackend, IndexSettings,
    RetrievedDocument, SearchHit, SearchRequest, SearchResponse, TensorFacet,
};
use crate::config::MEMORY_EMBEDDING_DIM;
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: FieldMap,
    facets: Vec<TensorFacet>,
    /// Write sequence, used as the tie-break so result order is stable.
    seq: u64,
}

#[derive(Debug, Default)]
struct IndexData {
    #[allow(dead_code)]
    settings: IndexSettings,
    documents: HashMap<String, StoredDocument>,
    next_seq: u64,
}

/// Thread-safe in-memory index store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    indexes: Arc<RwLock<HashMap<String, IndexData>>>,
}

impl MemoryBackend {
    /// Creates an empty backend with no indexes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held by an index.
    pub fn document_count(&self, index: &str) -> usize {
        self.indexes
            .read()
            .get(index)
            .map(|data| data.documents.len())
            .unwrap_or(0)
    }
}

impl IndexBackend for MemoryBackend {
    fn list_indexes(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.indexes.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn create_index(&self, name: &str, settings: &IndexSettings) -> Result<()> {
        let mut indexes = self.indexes.write();
        if indexes.contains_key(name) {
            return Err(StoreError::IndexExists(name.to_string()));
        }
        indexes.insert(
            name.to_string(),
            IndexData {
                settings: settings.clone(),
                ..IndexData::default()
            },
        );
        Ok(())
    }

    fn delete_index(&self, name: &str) -> Result<()> {
        if self.indexes.write().remove(name).is_none() {
            return Err(StoreError::Backend(format!("index '{}' not found", name)));
        }
        Ok(())
    }

    fn add_documents(
        &self,
        index: &str,
        documents: &[DocumentPayload],
        non_tensor_fields: &[&str],
    ) -> Result<AddDocumentsResponse> {
        let mut indexes = self.indexes.write();
        let data = indexes
            .get_mut(index)
            .ok_or_else(|| no_such_index(index))?;

        let mut items = Vec::with_capacity(documents.len());
        for payload in documents {
            let id = payload
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            // Facet order must be stable so "first facet" is well-defined.
            let mut tensor_fields: Vec<&String> = payload
                .fields
                .keys()
                .filter(|name| !non_tensor_fields.contains(&name.as_str()))
                .collect();
            tensor_fields.sort();

            // Only string-valued tensor fields produce facets; a document
            // whose tensor fields were never populated ends up with none.
            let facets: Vec<TensorFacet> = tensor_fields
                .into_iter()
                .filter_map(|name| {
                    payload.fields[name].as_str().map(|text| TensorFacet {
                        field: name.clone(),
                        embedding: embed(text),
                    })
                })
                .collect();

            let seq = data.next_seq;
            data.next_seq += 1;
            data.documents.insert(
                id.clone(),
                StoredDocument {
                    fields: payload.fields.clone(),
                    facets,
                    seq,
                },
            );
            items.push(AddedDocument { id });
        }

        Ok(AddDocumentsResponse { items })
    }

    fn get_document(
        &self,
        index: &str,
        id: &str,
        expose_facets: bool,
    ) -> Result<Option<RetrievedDocument>> {
        let indexes = self.indexes.read();
        let data = indexes.get(index).ok_or_else(|| no_such_index(index))?;
        Ok(data
            .documents
            .get(id)
            .map(|doc| retrieved(id, doc, expose_facets)))
    }

    fn get_documents(
        &self,
        index: &str,
        ids: &[String],
        expose_facets: bool,
    ) -> Result<Vec<RetrievedDocument>> {
        let indexes = self.indexes.read();
        let data = indexes.get(index).ok_or_else(|| no_such_index(index))?;
        Ok(ids
            .iter()
            .map(|id| match data.documents.get(id) {
                Some(doc) => retrieved(id, doc, expose_facets),
                None => RetrievedDocument {
                    id: id.clone(),
                    found: false,
                    fields: FieldMap::new(),
                    facets: Vec::new(),
                },
            })
            .collect())
    }

    fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let indexes = self.indexes.read();
        let data = indexes.get(index).ok_or_else(|| no_such_index(index))?;

        let filter = request
            .filter
            .as_deref()
            .map(parse_filter)
            .transpose()?;
        let query_tokens: BTreeSet<String> = tokenize(&request.query).collect();

        let mut scored: Vec<(f32, u64, &String, &StoredDocument)> = Vec::new();
        for (id, doc) in &data.documents {
            if let Some((field, value)) = &filter {
                if !field_matches(&doc.fields, field, value) {
                    continue;
                }
            }
            let score = if query_tokens.is_empty() {
                // Empty query enumerates: every document matches neutrally.
                1.0
            } else {
                let s = overlap_score(&query_tokens, doc);
                if s == 0.0 {
                    continue;
                }
                s
            };
            scored.push((score, doc.seq, id, doc));
        }

        // Descending score, insertion-order tie-break.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1)));
        scored.truncate(request.limit);

        let hits = scored
            .into_iter()
            .map(|(score, _, id, doc)| SearchHit {
                id: id.clone(),
                score,
                fields: select_attributes(&doc.fields, request.attributes.as_deref()),
            })
            .collect();

        Ok(SearchResponse { hits })
    }
}

fn no_such_index(index: &str) -> StoreError {
    StoreError::Backend(format!("index '{}' not found", index))
}

fn retrieved(id: &str, doc: &StoredDocument, expose_facets: bool) -> RetrievedDocument {
    RetrievedDocument {
        id: id.to_string(),
        found: true,
        fields: doc.fields.clone(),
        facets: if expose_facets {
            doc.facets.clone()
        } else {
            Vec::new()
        },
    }
}

/// Fraction of distinct query tokens found in the document's tensor fields.
fn overlap_score(query_tokens: &BTreeSet<String>, doc: &StoredDocument) -> f32 {
    let mut doc_tokens: BTreeSet<String> = BTreeSet::new();
    for facet in &doc.facets {
        if let Some(text) = doc.fields.get(&facet.field).and_then(|v| v.as_str()) {
            doc_tokens.extend(tokenize(text));
        }
    }
    let matched = query_tokens.iter().filter(|t| doc_tokens.contains(*t)).count();
    matched as f32 / query_tokens.len() as f32
}

/// Parses the `field:value` equality syntax. Anything more elaborate is
/// outside this backend's dialect.
fn parse_filter(filter: &str) -> Result<(String, String)> {
    match filter.split_once(':') {
        Some((field, value)) if !field.is_empty() && !value.is_empty() => {
            Ok((field.to_string(), value.to_string()))
        }
        _ => Err(StoreError::Backend(format!(
            "unsupported filter expression: '{}'",
            filter
        ))),
    }
}

fn field_matches(fields: &FieldMap, field: &str, value: &str) -> bool {
    match fields.get(field) {
        Some(serde_json::Value::String(s)) => s == value,
        Some(other) => other.to_string() == value,
        None => false,
    }
}

fn select_attributes(fields: &FieldMap, attributes: Option<&[String]>) -> FieldMap {
    match attributes {
        None => fields.clone(),
        Some(names) => fields
            .iter()
            .filter(|(k, _)| names.iter().any(|n| n == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Deterministic token-hash embedding: each token lands in an FNV-1a bucket,
/// then the vector is L2-normalized.
fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; MEMORY_EMBEDDING_DIM];
    for token in tokenize(text) {
        let bucket = (fnv1a(token.as_bytes()) as usize) % MEMORY_EMBEDDING_DIM;
        vector[bucket] += 1.0;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
