//! Vector store abstraction for commit documents
//!
//! The store owns the embedding provider: callers hand over plain text and
//! the store embeds it before writing or searching. This keeps the embedding
//! configuration (model + dimension) and the persisted vectors under one
//! roof, which is what makes the compatibility check on open possible.

pub mod lance_store;

pub use lance_store::LanceCommitStore;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexDocument, RetrievedCommit};

/// Persistent storage for embedded commit documents
#[async_trait]
pub trait CommitStore: Send + Sync {
    /// Return every document id currently stored in the collection
    ///
    /// Used as the dedup snapshot at the start of an indexing run. An empty
    /// or not-yet-created collection yields an empty set.
    async fn existing_ids(&self) -> Result<HashSet<String>>;

    /// Embed and persist a batch of documents, returning how many were written
    ///
    /// The write is append-only: callers are expected to have filtered out
    /// ids that are already stored.
    async fn add_documents(&self, documents: &[IndexDocument]) -> Result<usize>;

    /// Embed the query text and return the `limit` nearest documents,
    /// ordered by ascending distance
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedCommit>>;

    /// Number of documents currently stored
    async fn count(&self) -> Result<usize>;
}
