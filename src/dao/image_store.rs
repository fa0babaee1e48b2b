//! Disk storage for images uploaded alongside catalog items.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::dto::item::UploadedImage;

/// URL prefix under which the uploads directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 8;

/// Failures while writing or removing uploaded files.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("failed to create uploads directory `{path}`")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write uploaded image `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove uploaded image `{path}`")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploads under a root directory using random file names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Store writing below `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the images are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `image` and return the public path it is served under.
    pub async fn save(&self, image: &UploadedImage) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ImageStoreError::CreateDir {
                path: self.root.clone(),
                source,
            })?;

        let file_name = match image_extension(image) {
            Some(extension) => format!("{}.{extension}", Uuid::new_v4().simple()),
            None => Uuid::new_v4().simple().to_string(),
        };
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|source| ImageStoreError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = image.bytes.len(), "stored uploaded image");
        Ok(format!("{UPLOADS_URL_PREFIX}/{file_name}"))
    }

    /// Delete a file previously returned by [`ImageStore::save`]. Unknown paths are ignored.
    pub async fn remove(&self, public_path: &str) -> Result<(), ImageStoreError> {
        let Some(file_name) = public_path
            .strip_prefix(UPLOADS_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            return Ok(());
        };

        let path = self.root.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ImageStoreError::Remove { path, source }),
        }
    }
}

/// Lowercase alphanumeric extension taken from the file name, else from the image content type.
fn image_extension(image: &UploadedImage) -> Option<String> {
    let from_name = image
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let from_type = || {
        image
            .content_type
            .as_deref()
            .and_then(|mime| mime.strip_prefix("image/"))
            .map(|subtype| match subtype {
                "jpeg" => "jpg".to_owned(),
                "svg+xml" => "svg".to_owned(),
                other => other.to_ascii_lowercase(),
            })
    };

    from_name
        .or_else(from_type)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn upload(file_name: Option<&str>, content_type: Option<&str>) -> UploadedImage {
        UploadedImage {
            file_name: file_name.map(str::to_owned),
            content_type: content_type.map(str::to_owned),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn extension_prefers_file_name() {
        let image = upload(Some("Cover.PNG"), Some("image/jpeg"));
        assert_eq!(image_extension(&image).as_deref(), Some("png"));
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        let image = upload(Some("cover"), Some("image/jpeg"));
        assert_eq!(image_extension(&image).as_deref(), Some("jpg"));
    }

    #[test]
    fn suspicious_extensions_are_dropped() {
        let image = upload(Some("cover.p/ng"), None);
        assert_eq!(image_extension(&image), None);
        let image = upload(Some("cover.verylongextension"), None);
        assert_eq!(image_extension(&image), None);
    }

    #[tokio::test]
    async fn save_then_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        let public_path = store
            .save(&upload(Some("cover.png"), Some("image/png")))
            .await
            .unwrap();
        assert!(public_path.starts_with("/uploads/"));
        assert!(public_path.ends_with(".png"));

        let file_name = public_path.trim_start_matches("/uploads/");
        let on_disk = store.root().join(file_name);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"\x89PNG");

        store.remove(&public_path).await.unwrap();
        assert!(!on_disk.exists());
        store.remove(&public_path).await.unwrap();
    }

    #[tokio::test]
    async fn remove_ignores_paths_outside_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        store.remove("/etc/passwd").await.unwrap();
        store.remove("/uploads/../secret").await.unwrap();
    }
}
