//! Storage for uploaded profile photos
//!
//! Photos are written under the configured upload directory with generated
//! names and served back under the `/uploads` path prefix.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Public URL prefix the upload directory is served from
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Maximum number of photos accepted on signup
pub const MAX_SIGNUP_PHOTOS: usize = 5;

/// Store for uploaded files
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a new upload store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the upload directory exists
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        info!("Upload directory ready: {}", self.dir.display());
        Ok(())
    }

    /// Persist a photo and return its public URL path
    ///
    /// The stored name is generated; the original file name only
    /// contributes its extension.
    pub async fn save_photo(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_photo_returns_public_path() {
        let dir = std::env::temp_dir().join(format!("heartlink-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let url = store
            .save_photo(Some("selfie.png"), b"not-really-a-png")
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = dir.join(url.rsplit('/').next().unwrap());
        assert_eq!(tokio::fs::read(stored).await.unwrap(), b"not-really-a-png");

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_photo_defaults_extension() {
        let dir = std::env::temp_dir().join(format!("heartlink-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let url = store.save_photo(None, b"bytes").await.unwrap();
        assert!(url.ends_with(".jpg"));

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}
