//! Qdrant-backed chunk storage.

use std::collections::{HashMap, HashSet};

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct, RetrievedPoint,
    ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
    point_id::PointIdOptions, value::Kind,
};
use uuid::Uuid;

use crate::document::ChunkMetadata;
use crate::vector_store::{BoxFuture, ChunkRecord, QueryResult, VectorStore, VectorStoreError};

type QdrantResult<T> = Result<T, Box<qdrant_client::QdrantError>>;

/// Thin wrapper over [`Qdrant`] mapping chunk identity keys onto point ids.
///
/// Qdrant only accepts integer or UUID point ids, so each key is hashed into a
/// UUIDv5 and the key itself is kept in the `chunk_key` payload field.
#[derive(Clone)]
pub struct QdrantOps {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantOps").finish_non_exhaustive()
    }
}

impl QdrantOps {
    /// Create a new `QdrantOps` connected to the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str) -> QdrantResult<Self> {
        let client = Qdrant::from_url(url).build().map_err(Box::new)?;
        Ok(Self { client })
    }

    /// Stable point id for a chunk identity key.
    #[must_use]
    pub fn point_id_for(key: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
    }

    /// Ensure a collection exists with cosine distance vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached or collection creation fails.
    pub async fn ensure_collection(&self, collection: &str, vector_size: u64) -> QdrantResult<()> {
        if self
            .client
            .collection_exists(collection)
            .await
            .map_err(Box::new)?
        {
            return Ok(());
        }
        tracing::info!(collection, vector_size, "creating qdrant collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> QdrantResult<()> {
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// Fetch points by id without payloads or vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn get_points(
        &self,
        collection: &str,
        ids: Vec<PointId>,
    ) -> QdrantResult<Vec<RetrievedPoint>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, ids)
                    .with_payload(false)
                    .with_vectors(false),
            )
            .await
            .map_err(Box::new)?;
        Ok(response.result)
    }

    /// Search for similar vectors, returning scored points with payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> QdrantResult<Vec<ScoredPoint>> {
        let builder = SearchPointsBuilder::new(collection, vector, limit).with_payload(true);
        let results = self.client.search_points(builder).await.map_err(Box::new)?;
        Ok(results.result)
    }

    /// Build the point stored for a chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk index does not fit a payload integer.
    pub fn chunk_point(record: ChunkRecord) -> Result<PointStruct, VectorStoreError> {
        let chunk_id = i64::try_from(record.metadata.chunk_id)
            .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
        let point_id = Self::point_id_for(&record.id);
        let payload: HashMap<String, Value> = HashMap::from([
            ("document".to_owned(), Value::from(record.document)),
            ("chunk_key".to_owned(), Value::from(record.id)),
            ("chunk_id".to_owned(), Value::from(chunk_id)),
            ("pdf_name".to_owned(), Value::from(record.metadata.pdf_name)),
        ]);
        Ok(PointStruct::new(point_id, record.embedding, payload))
    }
}

impl VectorStore for QdrantOps {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.ensure_collection(&collection, vector_size)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn add(
        &self,
        collection: &str,
        record: ChunkRecord,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let point = Self::chunk_point(record)?;
            self.upsert(&collection, vec![point])
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))
        })
    }

    fn get(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<String>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let point_ids: Vec<PointId> = ids
                .iter()
                .map(|key| PointId::from(Self::point_id_for(key)))
                .collect();
            let points = self
                .get_points(&collection, point_ids)
                .await
                .map_err(|e| VectorStoreError::Get(e.to_string()))?;

            let present: HashSet<String> = points
                .into_iter()
                .filter_map(|p| match p.id?.point_id_options? {
                    PointIdOptions::Uuid(u) => Some(u),
                    PointIdOptions::Num(_) => None,
                })
                .collect();
            Ok(ids
                .into_iter()
                .filter(|key| present.contains(&Self::point_id_for(key)))
                .collect())
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
            let points = self
                .search(&collection, embedding, n_results)
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let mut result = QueryResult::default();
            for point in points {
                let (document, metadata) = scored_point_to_chunk(&point)?;
                result.push(document, metadata, 1.0 - point.score);
            }
            Ok(result)
        })
    }
}

fn scored_point_to_chunk(
    point: &ScoredPoint,
) -> Result<(String, ChunkMetadata), VectorStoreError> {
    let text_field = |name: &str| match point.payload.get(name).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => Ok(s.clone()),
        _ => Err(VectorStoreError::Serialization(format!(
            "point payload missing string field {name}"
        ))),
    };
    let chunk_id = match point.payload.get("chunk_id").and_then(|v| v.kind.as_ref()) {
        Some(Kind::IntegerValue(i)) => usize::try_from(*i).map_err(|_| {
            VectorStoreError::Serialization(format!("negative chunk_id {i}"))
        })?,
        _ => {
            return Err(VectorStoreError::Serialization(
                "point payload missing integer field chunk_id".into(),
            ));
        }
    };
    Ok((
        text_field("document")?,
        ChunkMetadata {
            chunk_id,
            pdf_name: text_field("pdf_name")?,
        },
    ))
}
