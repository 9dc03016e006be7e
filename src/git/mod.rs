//! Git history extraction for commit indexing
//!
//! Walks a repository's history, captures one record per reachable commit,
//! and renders each record into the document shape the store expects.

/// Pure conversion from commit records to indexable documents
pub mod document;
/// Repository walking and per-commit extraction
pub mod extractor;

pub use document::{build_document, build_documents, format_commit_date};
pub use extractor::{CommitExtractor, CommitRecord, DiffOutcome};
