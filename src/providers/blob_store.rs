use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::internal::BlobStoreError;

/// Location of an uploaded blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Public URL stored on entities and returned to clients
    pub url: String,
    /// Store-specific identifier used to destroy the blob later
    pub public_id: String,
}

/// Remote media storage collaborator
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        folder: &str,
        content_type: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError>;

    async fn destroy(&self, public_id: &str) -> Result<(), BlobStoreError>;

    /// Recover the public id from a URL previously returned by `upload`
    fn public_id_from_url(&self, url: &str) -> Option<String>;
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    content_type
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("bin")
}

fn strip_url_prefix(url_prefix: &str, url: &str) -> Option<String> {
    let marker = format!("{}/", url_prefix.trim_end_matches('/'));
    let start = url.find(&marker)? + marker.len();
    let public_id = &url[start..];
    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_string())
    }
}

/// Stores blobs on the local filesystem and serves them under a URL prefix
pub struct LocalBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, public_id: &str) -> Result<PathBuf, BlobStoreError> {
        let relative = Path::new(public_id);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || public_id.is_empty() {
            return Err(BlobStoreError::Destroy {
                public_id: public_id.to_string(),
                message: "public id escapes the media root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        folder: &str,
        content_type: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let folder = folder.trim_matches('/');
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let dir = self.root.join(folder);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BlobStoreError::Upload {
                folder: folder.to_string(),
                message: e.to_string(),
            })?;
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| BlobStoreError::Upload {
                folder: folder.to_string(),
                message: e.to_string(),
            })?;

        let public_id = format!("{}/{}", folder, file_name);
        tracing::debug!(public_id = %public_id, "Stored blob");
        Ok(StoredBlob {
            url: format!("{}/{}", self.url_prefix, public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), BlobStoreError> {
        let path = self.resolve(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone counts as destroyed
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::Destroy {
                public_id: public_id.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn public_id_from_url(&self, url: &str) -> Option<String> {
        strip_url_prefix(&self.url_prefix, url)
    }
}

/// In-memory blob store with switchable failures, for tests and local runs
#[derive(Default)]
pub struct MemoryBlobStore {
    state: Mutex<MemoryBlobState>,
}

#[derive(Default)]
struct MemoryBlobState {
    blobs: Vec<String>,
    destroyed: Vec<String>,
    fail_uploads: bool,
    fail_destroys: bool,
}

impl MemoryBlobStore {
    const URL_PREFIX: &'static str = "memory://blobs";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_uploads = fail;
        }
    }

    pub fn set_fail_destroys(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_destroys = fail;
        }
    }

    /// Public ids currently stored
    pub fn stored(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.blobs.clone())
            .unwrap_or_default()
    }

    /// Public ids successfully destroyed so far
    pub fn destroyed(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.destroyed.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        folder: &str,
        content_type: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let mut state = self.state.lock().map_err(|e| BlobStoreError::Upload {
            folder: folder.to_string(),
            message: e.to_string(),
        })?;
        if state.fail_uploads {
            return Err(BlobStoreError::Upload {
                folder: folder.to_string(),
                message: "upload rejected".to_string(),
            });
        }

        let public_id = format!(
            "{}/{}.{}",
            folder.trim_matches('/'),
            Uuid::new_v4(),
            extension_for(content_type)
        );
        state.blobs.push(public_id.clone());
        Ok(StoredBlob {
            url: format!("{}/{}", Self::URL_PREFIX, public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), BlobStoreError> {
        let mut state = self.state.lock().map_err(|e| BlobStoreError::Destroy {
            public_id: public_id.to_string(),
            message: e.to_string(),
        })?;
        if state.fail_destroys {
            return Err(BlobStoreError::Destroy {
                public_id: public_id.to_string(),
                message: "destroy rejected".to_string(),
            });
        }
        state.blobs.retain(|id| id != public_id);
        state.destroyed.push(public_id.to_string());
        Ok(())
    }

    fn public_id_from_url(&self, url: &str) -> Option<String> {
        strip_url_prefix(Self::URL_PREFIX, url)
    }
}
