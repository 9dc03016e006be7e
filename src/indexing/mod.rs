//! Incremental indexing pipeline
//!
//! Walks a repository, renders one document per commit, drops the ones whose
//! sha is already stored, and writes the remainder in batches. Re-running the
//! pipeline over the same history is a no-op for everything already indexed.

use std::path::Path;
use std::sync::Arc;

use crate::error::{RagError, Result};
use crate::git::{CommitExtractor, build_documents};
use crate::store::CommitStore;
use crate::types::{IndexDocument, IndexReport};

/// Drives one indexing run against a [`CommitStore`]
pub struct Indexer {
    store: Arc<dyn CommitStore>,
    batch_size: usize,
}

impl Indexer {
    pub fn new(store: Arc<dyn CommitStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Index the full commit history of the repository at `repo_path`
    ///
    /// Extraction runs on a blocking thread since libgit2 does synchronous
    /// IO. Failures opening or walking the repository abort the run; see
    /// [`Self::index_documents`] for how storage failures are handled.
    pub async fn index_repository(&self, repo_path: &Path) -> Result<IndexReport> {
        let commits = tokio::task::spawn_blocking({
            let path = repo_path.to_path_buf();
            move || {
                let extractor = CommitExtractor::open(&path)?;
                extractor.extract_commits()
            }
        })
        .await
        .map_err(|e| RagError::other(format!("Commit extraction task failed: {}", e)))??;

        let documents = build_documents(&commits);
        self.index_documents(documents).await
    }

    /// Dedup against the store and write what is new, in batches
    ///
    /// A failed batch is logged, recorded in the report, and skipped; the
    /// remaining batches are still written. Commits lost this way are picked
    /// up by the next run because their ids were never stored.
    pub async fn index_documents(&self, documents: Vec<IndexDocument>) -> Result<IndexReport> {
        let mut report = IndexReport {
            scanned: documents.len(),
            ..Default::default()
        };

        tracing::info!("Found {} commits in repository history", report.scanned);

        let existing = self.store.existing_ids().await?;
        let new_documents: Vec<IndexDocument> = documents
            .into_iter()
            .filter(|doc| !existing.contains(&doc.id))
            .collect();
        report.already_indexed = report.scanned - new_documents.len();

        if new_documents.is_empty() {
            tracing::info!("No new commits to index");
            return Ok(report);
        }

        tracing::info!(
            "Indexing {} new commits ({} already indexed)",
            new_documents.len(),
            report.already_indexed
        );

        let total = new_documents.len();
        let mut processed = 0;

        for (batch_index, batch) in new_documents.chunks(self.batch_size).enumerate() {
            processed += batch.len();
            match self.store.add_documents(batch).await {
                Ok(written) => {
                    report.added += written;
                    tracing::info!(
                        "Indexed batch {}: {}/{} new commits processed",
                        batch_index + 1,
                        processed,
                        total
                    );
                }
                Err(e) => {
                    report.failed_batches += 1;
                    let message = format!(
                        "Batch {} ({} commits) failed: {}",
                        batch_index + 1,
                        batch.len(),
                        e
                    );
                    tracing::warn!("{}", message);
                    report.errors.push(message);
                }
            }
        }

        Ok(report)
    }
}
