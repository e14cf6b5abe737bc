use std::collections::BTreeMap;
use std::path::Path;

use super::DocumentError;

/// Side file listing the chunk texts written during one ingestion run, keyed by
/// document name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkManifest {
    documents: BTreeMap<String, Vec<String>>,
}

impl ChunkManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document_name: impl Into<String>, chunks: Vec<String>) {
        self.documents.insert(document_name.into(), chunks);
    }

    #[must_use]
    pub fn get(&self, document_name: &str) -> Option<&[String]> {
        self.documents.get(document_name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Overwrite `path` with this manifest as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn write(&self, path: &Path) -> Result<(), DocumentError> {
        let bytes = serde_json::to_vec(&self.documents)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub async fn read(path: &Path) -> Result<Self, DocumentError> {
        let bytes = tokio::fs::read(path).await?;
        let documents = serde_json::from_slice(&bytes)?;
        Ok(Self { documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");

        let mut manifest = ChunkManifest::new();
        manifest.insert("b", vec!["two.".into()]);
        manifest.insert("a", vec!["one.".into(), "uno.".into()]);
        manifest.write(&path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"a":["one.","uno."],"b":["two."]}"#);

        let loaded = ChunkManifest::read(&path).await.unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.get("a").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_manifest_writes_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, r#"{"old":["stale."]}"#).unwrap();

        ChunkManifest::new().write(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn read_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            ChunkManifest::read(&path).await,
            Err(DocumentError::Json(_))
        ));
    }
}
