pub mod error;
pub mod loader;
pub mod manifest;
pub mod pipeline;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::{DocumentLoader, PdfLoader, TextLoader};
pub use manifest::ChunkManifest;
pub use pipeline::{IngestReport, IngestionPipeline};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, ChunkMetadata, Document, DocumentMetadata};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
