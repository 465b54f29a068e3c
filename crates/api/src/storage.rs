//! Local-disk storage for uploaded identity documents.
//!
//! Documents are addressed by their generated stored name only; the
//! storage root is never exposed as a static directory.

use std::io;
use std::path::{Path, PathBuf};

use kyc_core::document;

/// A document written to storage.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Generated file name, relative to the storage root.
    pub name: String,
    pub size: i64,
}

/// Reads and writes documents under a single root directory.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Write a new document under a generated name.
    pub async fn save(
        &self,
        original_filename: Option<&str>,
        data: &[u8],
    ) -> io::Result<StoredDocument> {
        self.ensure_root().await?;
        let name = document::stored_filename(original_filename);
        tokio::fs::write(self.root.join(&name), data).await?;
        Ok(StoredDocument {
            name,
            size: data.len() as i64,
        })
    }

    /// Read a stored document. Returns `Ok(None)` if it is missing.
    pub async fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.resolve(name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal, used to clean up after a failed submission.
    pub async fn remove(&self, name: &str) {
        let result = match self.resolve(name) {
            Ok(path) => tokio::fs::remove_file(path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(document = name, error = %e, "Failed to remove orphaned document");
        }
    }

    /// Map a stored name to a path, refusing anything that could escape the root.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stored document name '{name}'"),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path().join("docs"));

        let stored = storage.save(Some("passport.PDF"), b"%PDF").await.unwrap();
        assert!(stored.name.ends_with(".pdf"));
        assert_eq!(stored.size, 4);
        assert_eq!(storage.read(&stored.name).await.unwrap().unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path());
        assert!(storage.read("nope.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn traversal_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path());
        for name in ["../secret", "a/b.pdf", "..", ""] {
            let err = storage.read(name).await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{name}");
        }
    }

    #[tokio::test]
    async fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path());
        let stored = storage.save(None, b"data").await.unwrap();
        storage.remove(&stored.name).await;
        assert!(storage.read(&stored.name).await.unwrap().is_none());
    }
}
