//! Shared data model types for the indexing and query pipelines

/// Metadata stored alongside each commit document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    /// Author name
    pub author: String,
    /// Commit date, formatted `YYYY-MM-DD HH:MM:SS` in the committer's timezone
    pub date: String,
    /// Full commit SHA (also the document id)
    pub sha: String,
}

/// Unit of storage: one document per commit, keyed by sha
#[derive(Debug, Clone)]
pub struct IndexDocument {
    /// Document id; equals `metadata.sha` and is the sole dedup key
    pub id: String,
    /// Rendered document body submitted for embedding
    pub text: String,
    /// Structured metadata persisted next to the text
    pub metadata: CommitMetadata,
}

/// A document returned by similarity search, ranked best-first
#[derive(Debug, Clone)]
pub struct RetrievedCommit {
    /// Document id (commit sha)
    pub id: String,
    /// Stored document body
    pub text: String,
    /// Stored metadata
    pub metadata: CommitMetadata,
    /// Raw distance reported by the vector store (smaller is closer)
    pub distance: f32,
}

/// Outcome of one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Commits found in the repository walk
    pub scanned: usize,
    /// Commits skipped because their sha was already stored
    pub already_indexed: usize,
    /// Documents actually persisted in this run
    pub added: usize,
    /// Batches that failed and were skipped
    pub failed_batches: usize,
    /// Messages for the skipped batches, in order
    pub errors: Vec<String>,
}

impl IndexReport {
    /// True when every scanned commit was already present
    pub fn nothing_new(&self) -> bool {
        self.scanned == self.already_indexed
    }
}
