use std::future::Future;
use std::pin::Pin;

use crate::document::ChunkMetadata;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("get error: {0}")]
    Get(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One chunk as written to the store: text, metadata, identity key, and embedding.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

/// Nearest-neighbor results as parallel sequences, closest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub documents: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
}

impl QueryResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub(crate) fn push(&mut self, document: String, metadata: ChunkMetadata, distance: f32) {
        self.documents.push(document);
        self.metadatas.push(metadata);
        self.distances.push(distance);
    }
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Store a chunk under its identity key. Adding the same key again is a no-op
    /// apart from replacing the stored values.
    fn add(&self, collection: &str, record: ChunkRecord)
    -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Return the subset of `ids` present in the collection.
    fn get(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<String>, VectorStoreError>>;

    /// Return up to `n_results` chunks nearest to `embedding`, with cosine distances.
    fn query(
        &self,
        collection: &str,
        embedding: Vec<f32>,
        n_results: u64,
    ) -> BoxFuture<'_, Result<QueryResult, VectorStoreError>>;
}
