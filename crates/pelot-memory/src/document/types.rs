use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
    /// File name without its extension; the document's identity in the store.
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub document_name: String,
    pub chunk_index: usize,
}

impl Chunk {
    /// Identity key `{name}_doc_{index}`, unique per document and position.
    #[must_use]
    pub fn key(&self) -> String {
        chunk_key(&self.document_name, self.chunk_index)
    }

    #[must_use]
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            chunk_id: self.chunk_index,
            pdf_name: self.document_name.clone(),
        }
    }
}

#[must_use]
pub fn chunk_key(document_name: &str, index: usize) -> String {
    format!("{document_name}_doc_{index}")
}

/// Per-chunk metadata stored alongside the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: usize,
    pub pdf_name: String,
}
