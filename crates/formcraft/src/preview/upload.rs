//! Upload service collaborators for FILE and IMAGE answers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::UploadError;

pub const DEFAULT_FOLDER: &str = "form-uploads";
pub const DEFAULT_TAG: &str = "form-submission";

/// A file picked by the user, before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    pub folder: String,
    pub use_unique_file_name: bool,
    pub tags: Vec<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            use_unique_file_name: true,
            tags: vec![DEFAULT_TAG.to_string()],
        }
    }
}

/// What the upload service reports back for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub url: String,
    pub file_id: String,
    pub file_path: String,
    pub size: u64,
}

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: FileBlob, options: &UploadOptions)
    -> Result<UploadReceipt, UploadError>;
}

/// Pre-upload image processing (resizing, recompression).
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    async fn optimize(&self, file: FileBlob) -> Result<FileBlob, UploadError>;
}

/// Uploads images as picked.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughOptimizer;

#[async_trait]
impl ImageOptimizer for PassthroughOptimizer {
    async fn optimize(&self, file: FileBlob) -> Result<FileBlob, UploadError> {
        Ok(file)
    }
}

/// Hex SHA-256 of the content, used as the file id.
pub fn content_id(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Name the file is stored under; unique names get a random suffix before the extension.
pub fn stored_name(file_name: &str, options: &UploadOptions) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("upload");
    if !options.use_unique_file_name {
        return base.to_string();
    }
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    match base.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{stem}_{suffix}.{extension}"),
        _ => format!("{base}_{suffix}"),
    }
}

fn stored_path(file: &FileBlob, options: &UploadOptions) -> String {
    let folder = options.folder.trim_matches('/');
    let name = stored_name(&file.name, options);
    if folder.is_empty() {
        format!("/{name}")
    } else {
        format!("/{folder}/{name}")
    }
}

/// Keeps uploads in memory under `memory://` URLs.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    files: DashMap<String, Bytes>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_path: &str) -> Option<Bytes> {
        self.files.get(file_path).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl Uploader for MemoryUploader {
    async fn upload(
        &self,
        file: FileBlob,
        options: &UploadOptions,
    ) -> Result<UploadReceipt, UploadError> {
        let file_path = stored_path(&file, options);
        let receipt = UploadReceipt {
            url: format!("memory://{}", file_path.trim_start_matches('/')),
            file_id: content_id(&file.bytes),
            file_path: file_path.clone(),
            size: file.size(),
        };
        tracing::debug!(path = %file_path, size = receipt.size, tags = ?options.tags, "stored upload in memory");
        self.files.insert(file_path, file.bytes);
        Ok(receipt)
    }
}

/// Writes uploads below a local directory and hands out `file://` URLs.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Uploader for DirectoryUploader {
    async fn upload(
        &self,
        file: FileBlob,
        options: &UploadOptions,
    ) -> Result<UploadReceipt, UploadError> {
        let file_path = stored_path(&file, options);
        let target = self.root.join(file_path.trim_start_matches('/'));
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &file.bytes).await?;
        let absolute = tokio::fs::canonicalize(&target).await?;
        let url = Url::from_file_path(&absolute).map_err(|_| {
            UploadError::Rejected(format!("cannot express {} as a URL", absolute.display()))
        })?;
        tracing::debug!(path = %target.display(), size = file.size(), "stored upload on disk");
        Ok(UploadReceipt {
            url: url.to_string(),
            file_id: content_id(&file.bytes),
            file_path,
            size: file.size(),
        })
    }
}
