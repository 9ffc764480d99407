// src/media.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::AppError;

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[async_trait]
pub trait MediaManager: Send + Sync {
    /// Stores `bytes` and returns the public URL path of the new file.
    async fn save_file(&self, bytes: &[u8], original_name: &str, content_type: &str) -> Result<String, AppError>;

    /// Removes a file previously returned by `save_file`. Missing files are not an error.
    async fn delete_file(&self, url_path: &str) -> Result<(), AppError>;
}

pub struct LocalFileSystemMediaManager {
    root: PathBuf,
}

impl LocalFileSystemMediaManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaManager for LocalFileSystemMediaManager {
    async fn save_file(&self, bytes: &[u8], original_name: &str, content_type: &str) -> Result<String, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::validation(format!("Unsupported content type '{content_type}', expected an image")));
        }
        if bytes.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let file_name = match file_extension(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::internal(format!("Cannot create upload dir: {e}")))?;
        fs::write(self.root.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::internal(format!("Cannot write upload: {e}")))?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored uploaded file");
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }

    async fn delete_file(&self, url_path: &str) -> Result<(), AppError> {
        let Some(file_name) = url_path
            .strip_prefix(PUBLIC_PREFIX)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
        else {
            return Err(AppError::validation(format!("Not a managed file: {url_path}")));
        };

        match fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!("Cannot delete upload: {e}"))),
        }
    }
}

/// Lowercased extension of `name`, kept only if it is short and alphanumeric.
fn file_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    (ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("bookstore-media-{}", Uuid::new_v4()))
    }

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(file_extension("cover.PNG"), Some("png".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("bad.p/g"), None);
    }

    #[tokio::test]
    async fn saves_and_deletes_images() {
        let root = temp_root();
        let media = LocalFileSystemMediaManager::new(&root);

        let url = media.save_file(b"\x89PNG", "cover.png", "image/png").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = root.join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(&stored).unwrap(), b"\x89PNG");

        media.delete_file(&url).await.unwrap();
        assert!(!stored.exists());
        // Deleting twice is fine.
        media.delete_file(&url).await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn rejects_non_images_and_empty_files() {
        let media = LocalFileSystemMediaManager::new(temp_root());
        assert!(matches!(
            media.save_file(b"text", "notes.txt", "text/plain").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            media.save_file(b"", "empty.png", "image/png").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn refuses_paths_outside_the_upload_dir() {
        let media = LocalFileSystemMediaManager::new(temp_root());
        assert!(media.delete_file("/uploads/../secret").await.is_err());
        assert!(media.delete_file("/etc/passwd").await.is_err());
    }
}
