use super::EmbeddingProvider;
use crate::error::{EmbeddingError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::Path;
use std::sync::Mutex;

/// FastEmbed-based embedding provider
///
/// `TextEmbedding::embed` needs `&mut self`, so the model sits behind a
/// mutex; callers only hold it for the duration of one batch.
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Initialize a provider for the named model, caching downloads under
    /// `cache_dir`
    pub fn new(model_name: &str, cache_dir: &Path) -> Result<Self> {
        let (model, dimension) = resolve_model(model_name)?;

        tracing::info!("Initializing FastEmbed model: {}", model_name);

        let options = InitOptions::new(model)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);

        let text_embedding = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(text_embedding),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!("Generating embeddings for {} texts", texts.len());

        let mut model = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))?;

        let embeddings = model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::GenerationFailed(e.to_string()))?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Map a configured model name onto fastembed's catalog
fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    let resolved = match name {
        "all-MiniLM-L6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
        "all-MiniLM-L12-v2" => (EmbeddingModel::AllMiniLML12V2, 384),
        "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
        "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
        other => {
            return Err(EmbeddingError::InitializationFailed(format!(
                "Unknown embedding model '{}'",
                other
            ))
            .into());
        }
    };
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_known_models() {
        assert_eq!(resolve_model("all-MiniLM-L6-v2").unwrap().1, 384);
        assert_eq!(resolve_model("all-MiniLM-L12-v2").unwrap().1, 384);
        assert_eq!(resolve_model("bge-small-en-v1.5").unwrap().1, 384);
        assert_eq!(resolve_model("bge-base-en-v1.5").unwrap().1, 768);
    }

    #[test]
    fn test_resolve_unknown_model() {
        let err = resolve_model("word2vec").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding model 'word2vec'"));
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_embedding_generation() {
        let cache = TempDir::new().unwrap();
        let provider = FastEmbedProvider::new("all-MiniLM-L6-v2", cache.path()).unwrap();

        let texts = vec![
            "Fix authentication bug".to_string(),
            "Add retry logic to the uploader".to_string(),
        ];
        let embeddings = provider.embed_batch(texts).unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
        assert_eq!(embeddings[1].len(), 384);
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_provider_identity() {
        let cache = TempDir::new().unwrap();
        let provider = FastEmbedProvider::new("all-MiniLM-L6-v2", cache.path()).unwrap();

        assert_eq!(provider.model_name(), "all-MiniLM-L6-v2");
        assert_eq!(provider.dimension(), 384);
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_embed_query_matches_batch() {
        let cache = TempDir::new().unwrap();
        let provider = FastEmbedProvider::new("all-MiniLM-L6-v2", cache.path()).unwrap();

        let from_query = provider.embed_query("what changed in the parser").unwrap();
        let from_batch = provider
            .embed_batch(vec!["what changed in the parser".to_string()])
            .unwrap();

        assert_eq!(from_query, from_batch[0]);
    }
}
