//! Document ingestion and vector storage: loaders, chunking, and the store bridge.

pub mod document;
pub mod in_memory_store;
pub mod qdrant_ops;
pub mod vector_store;

pub use in_memory_store::InMemoryVectorStore;
pub use qdrant_ops::QdrantOps;
pub use vector_store::{ChunkRecord, QueryResult, VectorStore, VectorStoreError};
