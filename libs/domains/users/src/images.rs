//! Profile image files.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{UserError, UserResult};

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` under a fresh random name and return that name.
    async fn save(&self, bytes: &[u8]) -> UserResult<String>;

    /// Remove a stored image. Missing files are not an error.
    async fn delete(&self, name: &str) -> UserResult<()>;
}

/// Stores images as files in one directory.
#[derive(Debug, Clone)]
pub struct FileImageStore {
    dir: PathBuf,
}

impl FileImageStore {
    /// Creates the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> UserResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| UserError::Storage(format!("Failed to create {}: {e}", dir.display())))?;
        tracing::info!(dir = %dir.display(), "Profile image directory ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Only plain file names inside the store are accepted.
    fn path_of(&self, name: &str) -> Option<PathBuf> {
        let file_name = Path::new(name).file_name()?;
        (file_name == name).then(|| self.dir.join(file_name))
    }
}

#[async_trait]
impl ImageStore for FileImageStore {
    async fn save(&self, bytes: &[u8]) -> UserResult<String> {
        let name = Uuid::new_v4().simple().to_string();
        let path = self.dir.join(&name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| UserError::Storage(format!("Failed to write {}: {e}", path.display())))?;

        tracing::debug!(file = %name, size = bytes.len(), "Stored profile image");
        Ok(name)
    }

    async fn delete(&self, name: &str) -> UserResult<()> {
        let Some(path) = self.path_of(name) else {
            tracing::warn!(file = %name, "Refusing to delete image outside the store");
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UserError::Storage(format!("Failed to delete {}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TestUploadDir;

    #[tokio::test]
    async fn save_then_delete() {
        let upload = TestUploadDir::new();
        let store = FileImageStore::new(upload.path().join("profile")).await.unwrap();

        let name = store.save(b"image bytes").await.unwrap();
        assert_eq!(tokio::fs::read(store.dir().join(&name)).await.unwrap(), b"image bytes");
        assert_eq!(upload.file_count("profile"), 1);

        store.delete(&name).await.unwrap();
        assert_eq!(upload.file_count("profile"), 0);
    }

    #[tokio::test]
    async fn delete_missing_file_is_ok() {
        let upload = TestUploadDir::new();
        let store = FileImageStore::new(upload.path()).await.unwrap();
        assert!(store.delete("does-not-exist").await.is_ok());
    }

    #[tokio::test]
    async fn delete_ignores_paths_outside_store() {
        let upload = TestUploadDir::new();
        let store = FileImageStore::new(upload.path().join("profile")).await.unwrap();
        tokio::fs::write(upload.path().join("keep"), b"x").await.unwrap();

        store.delete("../keep").await.unwrap();
        assert!(upload.path().join("keep").exists());
    }
}
