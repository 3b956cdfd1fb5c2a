//! Context library for LLM enhancement
//!
//! A small document library the enhancement stage can search for background
//! material (datasheet excerpts, design notes). It is injected where needed;
//! nothing in the deterministic pipeline depends on it.

pub mod memory;
pub mod search;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

pub use memory::MemoryStore;
pub use search::{extract_search_terms, search_context_for_entities};
pub use sqlite::SqliteStore;

/// Upper bound on hits returned by a single query.
pub const MAX_QUERY_RESULTS: usize = 10;

pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextHit {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    /// Lower is closer
    pub distance: f64,
}

impl ContextHit {
    pub fn name(&self) -> &str {
        self.metadata.get("name").map(String::as_str).unwrap_or("unknown")
    }
}

pub trait ContextStore: Send + Sync {
    /// Insert or replace a document.
    fn upsert(&self, id: &str, text: &str, metadata: &Metadata) -> Result<(), StoreError>;

    /// Best matches for `text`, at most `min(k, MAX_QUERY_RESULTS)`.
    fn query(&self, text: &str, k: usize) -> Result<Vec<ContextHit>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Content-derived document id.
pub fn document_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Add a named document to a store. Blank text is ignored and yields `None`.
pub fn add_document(
    store: &dyn ContextStore,
    name: &str,
    text: &str,
    extra: Option<&Metadata>,
) -> Result<Option<String>, StoreError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let id = document_id(text);
    let mut metadata = Metadata::new();
    metadata.insert("name".to_string(), name.to_string());
    metadata.insert("type".to_string(), "design_doc".to_string());
    if let Some(extra) = extra {
        metadata.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    store.upsert(&id, text, &metadata)?;
    tracing::info!("Added '{}' to context library ({})", name, &id[..12]);
    Ok(Some(id))
}

/// Keyword relevance: total case-insensitive occurrences of the query's
/// whitespace-separated terms in the document.
pub(crate) fn relevance(query: &str, document: &str) -> usize {
    let doc = document.to_lowercase();
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(|t| doc.matches(t.as_str()).count())
        .sum()
}

/// Rank `(id, text, metadata)` documents in insertion order against a query.
pub(crate) fn rank<'a, I>(query: &str, k: usize, docs: I) -> Vec<ContextHit>
where
    I: IntoIterator<Item = (&'a str, &'a str, &'a Metadata)>,
{
    let mut scored: Vec<(usize, usize, ContextHit)> = docs
        .into_iter()
        .enumerate()
        .filter_map(|(order, (id, text, metadata))| {
            let score = relevance(query, text);
            (score > 0).then(|| {
                (
                    score,
                    order,
                    ContextHit {
                        id: id.to_string(),
                        text: text.to_string(),
                        metadata: metadata.clone(),
                        distance: 1.0 / (1.0 + score as f64),
                    },
                )
            })
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored
        .into_iter()
        .take(k.min(MAX_QUERY_RESULTS))
        .map(|(_, _, hit)| hit)
        .collect()
}
