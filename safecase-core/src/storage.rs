//! Blob storage collaborator.
//!
//! Evidence records hold a non-owning URL to the stored file. Blob lifecycle
//! belongs to the store, not to the evidence model.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{Result, SafecaseError};
use crate::model::{media_type_for_extension, CaseId};

/// Build the blob path for a new upload: `{case_id}/{unique}.{ext}`.
pub fn blob_path(case_id: CaseId, extension: &str) -> String {
    format!("{}/{}.{}", case_id, Uuid::new_v4(), extension)
}

/// Durable byte storage that issues retrievable URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return a stable, retrievable URL.
    async fn put(&self, path: &str, bytes: &[u8], media_type: &str) -> Result<String>;

    /// Read the blob at `path`, `None` when it does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<StoredBlob>>;

    /// Remove the blob at `path`. Removing a missing blob is not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Blob bytes with the media type they are served as.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// In-memory blob store (development and tests).
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: DashMap<String, StoredBlob>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://evidence")
    }
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: DashMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<StoredBlob> {
        self.blobs.get(path).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, bytes: &[u8], media_type: &str) -> Result<String> {
        validate_blob_path(path)?;
        self.blobs.insert(
            path.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                media_type: media_type.to_string(),
            },
        );
        Ok(public_url(&self.base_url, path))
    }

    async fn fetch(&self, path: &str) -> Result<Option<StoredBlob>> {
        Ok(self.get(path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.blobs.remove(path);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Blob store on the local filesystem, served under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_blob_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8], _media_type: &str) -> Result<String> {
        let target = self.resolve(path)?;
        let storage_err =
            |e: std::io::Error| SafecaseError::StorageFailure(format!("{}: {e}", target.display()));

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        // Write then rename so a reader never sees a partial blob.
        let staging = target.with_extension("partial");
        tokio::fs::write(&staging, bytes).await.map_err(storage_err)?;
        tokio::fs::rename(&staging, &target).await.map_err(storage_err)?;

        tracing::debug!(blob_path = %path, bytes = bytes.len(), "Blob written");
        Ok(public_url(&self.base_url, path))
    }

    async fn fetch(&self, path: &str) -> Result<Option<StoredBlob>> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => {
                let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
                Ok(Some(StoredBlob {
                    bytes,
                    media_type: media_type_for_extension(extension).to_string(),
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SafecaseError::StorageFailure(format!(
                "{}: {e}",
                target.display()
            ))),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SafecaseError::StorageFailure(format!(
                "{}: {e}",
                target.display()
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Reject absolute paths and any `..`/`.` components.
fn validate_blob_path(path: &str) -> Result<()> {
    let candidate = Path::new(path);
    let valid = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(())
    } else {
        Err(SafecaseError::StorageFailure(format!(
            "Refusing blob path '{path}'"
        )))
    }
}

fn public_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
