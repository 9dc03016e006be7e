//! Centralized error types for commit-rag using thiserror
//!
//! One sub-enum per subsystem, wrapped by [`RagError`] at the crate boundary.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RagError>;

/// Main error type for the RAG pipeline
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while walking repository history
///
/// Per-commit diff failures are not represented here: they degrade to a
/// metadata-only document instead of failing the run.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Not a git repository: {0}")]
    InvalidRepository(String),

    #[error("Failed to resolve HEAD: {0}")]
    HeadNotFound(String),

    #[error("Failed to walk commit history: {0}")]
    WalkFailed(String),

    #[error("Failed to read commit {sha}: {reason}")]
    CommitReadFailed { sha: String, reason: String },
}

/// Errors raised by the vector store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to connect to vector store at '{path}': {reason}")]
    ConnectionFailed { path: String, reason: String },

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Failed to create collection '{collection}': {reason}")]
    CollectionCreationFailed { collection: String, reason: String },

    #[error(
        "Collection '{collection}' was created with embedding model '{stored_model}' \
         ({stored_dimension} dimensions) but '{requested_model}' ({requested_dimension} \
         dimensions) was requested"
    )]
    EmbeddingConfigMismatch {
        collection: String,
        stored_model: String,
        stored_dimension: usize,
        requested_model: String,
        requested_dimension: usize,
    },

    #[error("Failed to fetch stored ids: {0}")]
    IdFetchFailed(String),

    #[error("Failed to write documents: {0}")]
    WriteFailed(String),

    #[error("Failed to search collection: {0}")]
    SearchFailed(String),

    #[error("Failed to count documents: {0}")]
    CountFailed(String),
}

/// Errors related to embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    InitializationFailed(String),

    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model lock was poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors raised by the generative backend
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Environment variable '{0}' is not set (required for the generation backend)")]
    MissingApiKey(String),

    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    #[error("Generation backend returned status {status}: {body}")]
    ApiFailure { status: u16, body: String },

    #[error("Generation response contained no choices")]
    EmptyResponse,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

// Conversion from anyhow::Error, for adapter code that bubbles contexts up
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Other(format!("{:#}", err))
    }
}

impl RagError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        RagError::Other(msg.into())
    }

    /// True when the store was unreachable or rejected access because the
    /// collection does not exist or was created under a different embedding
    /// configuration. The chat tool treats these as "index first" startup
    /// failures.
    pub fn needs_indexing(&self) -> bool {
        matches!(
            self,
            RagError::Store(
                StoreError::ConnectionFailed { .. }
                    | StoreError::CollectionNotFound(_)
                    | StoreError::EmbeddingConfigMismatch { .. }
            )
        )
    }
}
