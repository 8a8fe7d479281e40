use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A file accepted by a [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_name: String,
    pub size: u64,
}

/// Where attachment bytes live. Services only record metadata and ask the
/// store to save or delete by stored name.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save(&self, original_name: &str, content: &[u8]) -> Result<StoredFile>;

    async fn delete(&self, stored_name: &str) -> Result<()>;
}

/// Stores attachments as flat files under a base directory.
pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates the base directory if needed.
    pub async fn init(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).await.map_err(|e| {
                Error::Internal(format!("Failed to create storage directory {:?}: {}", self.base_path, e))
            })?;
        }
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, stored_name: &str) -> Result<PathBuf> {
        // Stored names are generated here; anything with a separator did not come from us.
        if stored_name.is_empty() || stored_name.contains(['/', '\\']) || stored_name.starts_with('.') {
            return Err(Error::BadRequest(format!("Invalid stored file name: {}", stored_name)));
        }
        Ok(self.base_path.join(stored_name))
    }
}

/// Builds `<uuid><.ext>` from the uploaded name, keeping a short alphanumeric extension.
pub fn stored_name_for(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), extension)
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, original_name: &str, content: &[u8]) -> Result<StoredFile> {
        let stored_name = stored_name_for(original_name);
        let file_path = self.file_path(&stored_name)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::Internal(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        fs::write(&file_path, content).await.map_err(|e| {
            Error::Internal(format!("Failed to write file {:?}: {}", file_path, e))
        })?;

        Ok(StoredFile {
            stored_name,
            size: content.len() as u64,
        })
    }

    async fn delete(&self, stored_name: &str) -> Result<()> {
        let file_path = self.file_path(stored_name)?;
        fs::remove_file(&file_path).await.map_err(|e| {
            Error::Internal(format!("Failed to delete file {:?}: {}", file_path, e))
        })
    }
}

/// Deletes stored files one by one, logging and skipping failures.
pub async fn remove_files_best_effort(store: &dyn FileStore, stored_names: &[String]) {
    for stored_name in stored_names {
        if let Err(e) = store.delete(stored_name).await {
            tracing::warn!(stored_name = %stored_name, error = %e, "Failed to delete stored attachment file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_keeps_extension() {
        let name = stored_name_for("Quarterly Report.PDF");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_stored_name_drops_odd_extensions() {
        assert_eq!(stored_name_for("README").len(), 36);
        assert_eq!(stored_name_for("archive.tar.g z").len(), 36);
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let dir = std::env::temp_dir().join(format!("taskboard-store-{}", Uuid::new_v4()));
        let store = LocalFileStore::new(&dir);
        store.init().await.unwrap();

        let stored = store.save("notes.txt", b"hello").await.unwrap();
        assert_eq!(stored.size, 5);
        let on_disk = tokio::fs::read(dir.join(&stored.stored_name)).await.unwrap();
        assert_eq!(on_disk, b"hello");

        store.delete(&stored.stored_name).await.unwrap();
        assert!(store.delete(&stored.stored_name).await.is_err());
        assert!(store.delete("../escape").await.is_err());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
