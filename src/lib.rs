//! # Commit RAG - Question Answering over Git Commit History
//!
//! Indexes a repository's commit history into a persistent vector store and
//! answers natural-language questions about it with retrieval-augmented
//! generation (RAG).
//!
//! ## Overview
//!
//! The write path walks a repository with git2, renders one document per
//! commit (full `git show` style output for regular commits, a metadata-only
//! fallback for merges and unreadable diffs), embeds the documents locally
//! with FastEmbed, and appends anything new to a LanceDB collection keyed by
//! commit sha. Re-running the indexer only adds commits that are not stored
//! yet.
//!
//! The read path embeds the user's question with the same model, retrieves
//! the closest stored commits, and feeds them as grounding context to an
//! OpenAI-compatible generative backend. When nothing relevant is stored,
//! the answer says so instead of letting the model guess.
//!
//! ```text
//! write path                         read path
//! ----------                        ----------
//! git2 history walk                 user question
//!        |                               |
//! document builder                  retriever (top-K)
//!        |                               |
//! dedup by sha                      grounded prompt
//!        |                               |
//! FastEmbed ------> LanceDB <------ FastEmbed
//!                                        |
//!                                  chat completions
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use commit_rag::config::Config;
//! use commit_rag::embedding::FastEmbedProvider;
//! use commit_rag::indexing::Indexer;
//! use commit_rag::store::LanceCommitStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new()?;
//!
//!     let embedder = Arc::new(FastEmbedProvider::new(
//!         &config.embedding.model_name,
//!         &config.embedding.cache_dir,
//!     )?);
//!     let store = Arc::new(
//!         LanceCommitStore::open_or_create(
//!             &config.store.db_path,
//!             &config.store.collection,
//!             embedder,
//!         )
//!         .await?,
//!     );
//!
//!     let report = Indexer::new(store, config.indexing.batch_size)
//!         .index_repository(Path::new("/path/to/repo"))
//!         .await?;
//!     println!("indexed {} new commits", report.added);
//!     Ok(())
//! }
//! ```

/// Retrieval and grounded answer synthesis
pub mod answer;

/// Interactive chat session loop
pub mod chat;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation using FastEmbed (all-MiniLM-L6-v2)
pub mod embedding;

/// Error types and utilities
pub mod error;

/// Text generation backends (OpenAI-compatible chat completions)
pub mod generation;

/// Git repository walking and commit document rendering
pub mod git;

/// Incremental indexing pipeline
pub mod indexing;

/// Platform data, cache, and config locations
pub mod paths;

/// Vector store abstraction and the LanceDB implementation
pub mod store;

/// Shared data model types
pub mod types;
