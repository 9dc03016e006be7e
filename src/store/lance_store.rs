//! LanceDB-backed commit store (embedded, no server required)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    types::Float32Type,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use lancedb::Table;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, StoreError};
use crate::store::CommitStore;
use crate::types::{CommitMetadata, IndexDocument, RetrievedCommit};

/// Embedding configuration recorded next to a collection when it is created
/// and checked on every subsequent open. Vectors written under one model are
/// meaningless to another, so a mismatch is a hard error rather than a
/// silent reindex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CollectionMeta {
    embedding_model: String,
    dimension: usize,
}

/// LanceDB implementation of [`CommitStore`]
pub struct LanceCommitStore {
    connection: Connection,
    collection: String,
    db_path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl LanceCommitStore {
    /// Connect for indexing. The collection is created on the first write if
    /// it does not exist yet; an existing collection must have been created
    /// under the same embedding configuration as `embedder`.
    pub async fn open_or_create(
        db_path: &Path,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(db_path).await?;

        let store = Self::connect(db_path, collection, embedder).await?;
        if store.table_exists().await? {
            store.verify_meta()?;
        }
        Ok(store)
    }

    /// Connect for querying. Fails with [`StoreError::CollectionNotFound`]
    /// when the collection has never been indexed.
    pub async fn open_existing(
        db_path: &Path,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let store = Self::connect(db_path, collection, embedder).await?;
        if !store.table_exists().await? {
            return Err(StoreError::CollectionNotFound(store.collection.clone()).into());
        }
        store.verify_meta()?;
        Ok(store)
    }

    async fn connect(
        db_path: &Path,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let uri = db_path.to_string_lossy();
        tracing::info!("Connecting to LanceDB at: {}", uri);

        let connection = lancedb::connect(uri.as_ref())
            .execute()
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                path: uri.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            connection,
            collection: collection.to_string(),
            db_path: db_path.to_path_buf(),
            embedder,
        })
    }

    fn schema(&self) -> Arc<Schema> {
        let dimension = self.embedder.dimension();
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("author", DataType::Utf8, false),
            Field::new("date", DataType::Utf8, false),
            Field::new("sha", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimension as i32,
                ),
                false,
            ),
        ]))
    }

    async fn table_exists(&self) -> Result<bool> {
        let names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                path: self.db_path.to_string_lossy().to_string(),
                reason: format!("Failed to list collections: {}", e),
            })?;
        Ok(names.contains(&self.collection))
    }

    async fn open_table(&self) -> Result<Table> {
        let table = self
            .connection
            .open_table(&self.collection)
            .execute()
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                path: self.db_path.to_string_lossy().to_string(),
                reason: format!("Failed to open collection '{}': {}", self.collection, e),
            })?;
        Ok(table)
    }

    fn meta_path(&self) -> PathBuf {
        self.db_path.join(format!("{}.meta.json", self.collection))
    }

    fn current_meta(&self) -> CollectionMeta {
        CollectionMeta {
            embedding_model: self.embedder.model_name().to_string(),
            dimension: self.embedder.dimension(),
        }
    }

    fn write_meta(&self) -> Result<()> {
        let meta = self.current_meta();
        let json = serde_json::to_string_pretty(&meta).map_err(|e| {
            StoreError::CollectionCreationFailed {
                collection: self.collection.clone(),
                reason: format!("Failed to serialize collection metadata: {}", e),
            }
        })?;
        std::fs::write(self.meta_path(), json)?;
        Ok(())
    }

    /// Compare the recorded embedding configuration against the provider we
    /// were constructed with.
    ///
    /// Collections written before metadata tracking have no sidecar file; we
    /// adopt the current configuration and record it so later opens are
    /// checked.
    fn verify_meta(&self) -> Result<()> {
        let path = self.meta_path();
        if !path.exists() {
            tracing::warn!(
                "Collection '{}' has no recorded embedding configuration, adopting '{}'",
                self.collection,
                self.embedder.model_name()
            );
            return self.write_meta();
        }

        let raw = std::fs::read_to_string(&path)?;
        let stored: CollectionMeta =
            serde_json::from_str(&raw).map_err(|e| StoreError::ConnectionFailed {
                path: self.db_path.to_string_lossy().to_string(),
                reason: format!("Invalid collection metadata at '{}': {}", path.display(), e),
            })?;

        let current = self.current_meta();
        if stored != current {
            return Err(StoreError::EmbeddingConfigMismatch {
                collection: self.collection.clone(),
                stored_model: stored.embedding_model,
                stored_dimension: stored.dimension,
                requested_model: current.embedding_model,
                requested_dimension: current.dimension,
            }
            .into());
        }

        Ok(())
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    batch
        .column_by_name(name)?
        .as_any()
        .downcast_ref::<StringArray>()
}

#[async_trait]
impl CommitStore for LanceCommitStore {
    async fn existing_ids(&self) -> Result<HashSet<String>> {
        if !self.table_exists().await? {
            return Ok(HashSet::new());
        }

        let table = self.open_table().await?;
        let stream = table
            .query()
            .select(lancedb::query::Select::Columns(vec!["id".to_string()]))
            .execute()
            .await
            .map_err(|e| StoreError::IdFetchFailed(e.to_string()))?;

        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| StoreError::IdFetchFailed(e.to_string()))?;

        let mut ids = HashSet::new();
        for batch in batches {
            let column = string_column(&batch, "id").ok_or_else(|| {
                StoreError::IdFetchFailed("Missing or invalid 'id' column".to_string())
            })?;
            for i in 0..batch.num_rows() {
                ids.insert(column.value(i).to_string());
            }
        }

        Ok(ids)
    }

    async fn add_documents(&self, documents: &[IndexDocument]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(texts.clone())?;

        let dimension = self.embedder.dimension();
        let schema = self.schema();

        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let authors: Vec<String> = documents.iter().map(|d| d.metadata.author.clone()).collect();
        let dates: Vec<String> = documents.iter().map(|d| d.metadata.date.clone()).collect();
        let shas: Vec<String> = documents.iter().map(|d| d.metadata.sha.clone()).collect();

        let vectors = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            embeddings
                .iter()
                .map(|embedding| Some(embedding.iter().map(|&v| Some(v)).collect::<Vec<_>>())),
            dimension as i32,
        );

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(texts)),
                Arc::new(StringArray::from(authors)),
                Arc::new(StringArray::from(dates)),
                Arc::new(StringArray::from(shas)),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| StoreError::WriteFailed(format!("Failed to build record batch: {}", e)))?;

        let batches = RecordBatchIterator::new(vec![batch].into_iter().map(Ok), schema.clone());

        if self.table_exists().await? {
            let table = self.open_table().await?;
            table
                .add(Box::new(batches))
                .execute()
                .await
                .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        } else {
            self.connection
                .create_table(&self.collection, Box::new(batches))
                .execute()
                .await
                .map_err(|e| StoreError::CollectionCreationFailed {
                    collection: self.collection.clone(),
                    reason: e.to_string(),
                })?;
            self.write_meta()?;
            tracing::info!(
                "Created collection '{}' ({} dimensions)",
                self.collection,
                dimension
            );
        }

        tracing::debug!(
            "Wrote {} documents to collection '{}'",
            documents.len(),
            self.collection
        );
        Ok(documents.len())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedCommit>> {
        if !self.table_exists().await? {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query)?;
        let table = self.open_table().await?;

        let stream = table
            .vector_search(query_vector)
            .map_err(|e| StoreError::SearchFailed(e.to_string()))?
            .limit(limit)
            .execute()
            .await
            .map_err(|e| StoreError::SearchFailed(e.to_string()))?;

        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| StoreError::SearchFailed(e.to_string()))?;

        let mut results = Vec::new();
        for batch in batches {
            let ids = string_column(&batch, "id").ok_or_else(|| {
                StoreError::SearchFailed("Missing or invalid 'id' column".to_string())
            })?;
            let texts = string_column(&batch, "text").ok_or_else(|| {
                StoreError::SearchFailed("Missing or invalid 'text' column".to_string())
            })?;
            let authors = string_column(&batch, "author").ok_or_else(|| {
                StoreError::SearchFailed("Missing or invalid 'author' column".to_string())
            })?;
            let dates = string_column(&batch, "date").ok_or_else(|| {
                StoreError::SearchFailed("Missing or invalid 'date' column".to_string())
            })?;
            let shas = string_column(&batch, "sha").ok_or_else(|| {
                StoreError::SearchFailed("Missing or invalid 'sha' column".to_string())
            })?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| {
                    StoreError::SearchFailed("Missing or invalid '_distance' column".to_string())
                })?;

            for i in 0..batch.num_rows() {
                results.push(RetrievedCommit {
                    id: ids.value(i).to_string(),
                    text: texts.value(i).to_string(),
                    metadata: CommitMetadata {
                        author: authors.value(i).to_string(),
                        date: dates.value(i).to_string(),
                        sha: shas.value(i).to_string(),
                    },
                    distance: distances.value(i),
                });
            }
        }

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let table = self.open_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| StoreError::CountFailed(e.to_string()))?;
        Ok(count)
    }
}
