//! File storage backend for learner uploads.
//!
//! The core only needs to put bytes somewhere and get a URL back; what the
//! URL points at is not interpreted. [`LocalStorage`] writes under a root
//! directory and publishes URLs beneath a configurable base.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object, and return its
    /// public URL.
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<String, StorageError>;

    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Reduce a client-supplied file name to a safe single component:
/// directory parts are dropped and only `[A-Za-z0-9._-]` is kept.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Storage path for a learner's upload.
pub fn learner_upload_path(learner_id: DbId, file_name: &str) -> String {
    format!("onboarding/{learner_id}/{}", sanitize_file_name(file_name))
}

// ---------------------------------------------------------------------------
// Local filesystem backend
// ---------------------------------------------------------------------------

pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a relative storage path under the root. Absolute paths and
    /// parent references are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let mut has_file = false;
        for component in relative.components() {
            match component {
                Component::Normal(_) => has_file = true,
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(path.to_string())),
            }
        }
        if !has_file {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<String, StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(self.public_url(path))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
