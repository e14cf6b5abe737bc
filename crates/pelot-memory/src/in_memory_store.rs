use std::collections::HashMap;
use std::sync::RwLock;

use crate::document::ChunkMetadata;
use crate::vector_store::{
    BoxFuture, ChunkRecord, QueryResult, VectorStore, VectorStoreError,
};

struct StoredChunk {
    vector: Vec<f32>,
    document: String,
    metadata: ChunkMetadata,
}

type InMemoryCollection = HashMap<String, StoredChunk>;

/// Process-local store with brute-force cosine search. Contents do not survive a restart.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn not_found(collection: &str) -> String {
    format!("collection {collection} not found")
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        _vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            cols.entry(collection).or_default();
            Ok(())
        })
    }

    fn add(
        &self,
        collection: &str,
        record: ChunkRecord,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let col = cols
                .get_mut(&collection)
                .ok_or_else(|| VectorStoreError::Upsert(not_found(&collection)))?;
            col.insert(
                record.id,
                StoredChunk {
                    vector: record.embedding,
                    document: record.document,
                    metadata: record.metadata,
                },
            );
            Ok(())
        })
    }

    fn get(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<String>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Get(e.to_string()))?;
            let col = cols
                .get(&collection)
                .ok_or_else(|| VectorStoreError::Get(not_found(&collection)))?;
            Ok(ids.into_iter().filter(|id| col.contains_key(id)).collect())
        })
    }

    fn query(
        &self,
        collection: &str,
        embedding: Vec<f32>,
        n_results: u64,
    ) -> BoxFuture<'_, Result<QueryResult, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let col = cols
                .get(&collection)
                .ok_or_else(|| VectorStoreError::Search(not_found(&collection)))?;

            let mut scored: Vec<(&String, &StoredChunk, f32)> = col
                .iter()
                .map(|(id, chunk)| (id, chunk, cosine_similarity(&embedding, &chunk.vector)))
                .collect();
            scored.sort_by(|a, b| {
                b.2.partial_cmp(&a.2)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });
            #[expect(clippy::cast_possible_truncation)]
            scored.truncate(n_results as usize);

            let mut result = QueryResult::default();
            for (_, chunk, score) in scored {
                result.push(chunk.document.clone(), chunk.metadata.clone(), 1.0 - score);
            }
            Ok(result)
        })
    }
}
