use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tokio::fs;

use crate::errors::{AppError, Result};

/// A directory that owns the files written beneath it.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        // Create base directory if it doesn't exist
        std::fs::create_dir_all(&base_path).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Whether `path` lies under this store's root.
    pub fn owns(&self, path: &Path) -> bool {
        path.starts_with(&self.base_path)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// Writes `data` under `filename` and returns the full path. The name
    /// must already be a single sanitized component.
    pub async fn store_bytes(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = self.base_path.join(filename);
        if !self.owns(&full_path) || full_path.parent() != Some(self.base_path.as_path()) {
            return Err(AppError::Validation("Invalid file name".to_string()));
        }

        // Root may have been removed since startup
        fs::create_dir_all(&self.base_path).await?;
        fs::write(&full_path, data).await?;

        Ok(full_path)
    }

    /// Opens a stored file for reading together with its length.
    /// `None` when the file is gone.
    pub async fn open(&self, path: &Path) -> Result<Option<(fs::File, u64)>> {
        match fs::File::open(path).await {
            Ok(file) => {
                let len = file.metadata().await?.len();
                Ok(Some((file, len)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a file this store owns. Returns whether a file was actually
    /// deleted; a file that is already gone is not an error.
    pub async fn remove(&self, path: &Path) -> Result<bool> {
        if !self.owns(path) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Refusing to remove {} outside of {}",
                path.display(),
                self.base_path.display()
            )));
        }

        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort removal: failures are logged, never returned.
    pub async fn discard(&self, path: &Path) -> bool {
        match self.remove(path).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to remove file: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_local_storage_operations() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("audio")).unwrap();

        let test_data = b"RIFF....WAVE";

        let path = storage.store_bytes("clip.wav", test_data).await.unwrap();
        assert!(storage.owns(&path));

        let (mut file, len) = storage.open(&path).await.unwrap().unwrap();
        assert_eq!(len, test_data.len() as u64);
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, test_data);

        assert!(storage.remove(&path).await.unwrap());
        assert!(!storage.remove(&path).await.unwrap());
        assert!(storage.open(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("voices")).unwrap();

        assert!(storage.store_bytes("../escape.wav", b"x").await.is_err());
        assert!(storage.store_bytes("nested/clip.wav", b"x").await.is_err());

        let outside = temp_dir.path().join("other.wav");
        std::fs::write(&outside, b"keep me").unwrap();
        assert!(storage.remove(&outside).await.is_err());
        assert!(!storage.discard(&outside).await);
        assert!(outside.exists());

        let sneaky = storage.base_path().join("..").join("other.wav");
        assert!(!storage.owns(&sneaky));
    }

    #[tokio::test]
    async fn test_recreates_missing_root() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("generated");
        let storage = LocalStorage::new(&root).unwrap();

        std::fs::remove_dir_all(&root).unwrap();
        let path = storage.store_bytes("again.wav", b"data").await.unwrap();
        assert!(path.exists());
    }
}
