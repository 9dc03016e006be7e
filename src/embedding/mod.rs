//! Embedding generation
//!
//! The provider must be identical between index time and query time for a
//! given collection; the store persists the provider's identity to enforce
//! this.

mod fastembed_provider;

pub use fastembed_provider::FastEmbedProvider;

use crate::error::{EmbeddingError, Result};

/// Trait for embedding generation
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(vec![text.to_string()])?;
        embeddings.pop().ok_or_else(|| {
            EmbeddingError::GenerationFailed("provider returned no vectors".to_string()).into()
        })
    }

    /// Dimension of the produced vectors
    fn dimension(&self) -> usize;

    /// Stable model identifier, persisted with the collection
    fn model_name(&self) -> &str;
}
