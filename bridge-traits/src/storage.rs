//! Storage Abstractions
//!
//! Local file system access and the remote storage provider contract used by
//! the upload protocol.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// Abstracts the read-only file operations the uploader needs so that the
/// protocol can be exercised against an in-memory file system in tests.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn size_of(fs: &dyn FileSystemAccess, path: &Path) -> Result<u64> {
///     Ok(fs.metadata(path).await?.size)
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read at most `len` bytes from the start of the file
    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Bytes>;

    /// Open a file for streaming reads
    async fn open_read_stream(
        &self,
        path: &Path,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
}

/// Remote object metadata as reported by a storage provider
///
/// `md5_checksum` is `None` when the provider does not know the content hash
/// (e.g. native documents); an unknown checksum never equals a local one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteObject {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub md5_checksum: Option<String>,
    pub size: Option<u64>,
    pub parent_ids: Vec<String>,
    pub is_folder: bool,
    pub trashed: bool,
    pub web_view_link: Option<String>,
    pub web_content_link: Option<String>,
}

/// Metadata announced when negotiating an upload session
///
/// `mime_type` and `size` are advisory; an unknown size must not block the
/// transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
}

/// Position of one chunk within the content sent to an upload session
///
/// `total` stays `None` until the chunk that ends the content, which must
/// carry the final size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub offset: u64,
    pub len: u64,
    pub total: Option<u64>,
}

impl ChunkRange {
    /// Value of the `Content-Range` header describing this chunk
    pub fn content_range(&self) -> String {
        let total = self
            .total
            .map(|total| total.to_string())
            .unwrap_or_else(|| "*".to_string());

        if self.len == 0 {
            format!("bytes */{}", total)
        } else {
            format!(
                "bytes {}-{}/{}",
                self.offset,
                self.offset + self.len - 1,
                total
            )
        }
    }

    pub fn is_final(&self) -> bool {
        self.total.is_some()
    }
}

/// State of an upload session after a chunk was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadProgress {
    /// The session persisted the first `received` bytes and expects more
    Incomplete { received: u64 },
    /// The object is complete; `object_id` is absent if the provider did not
    /// report one
    Complete { object_id: Option<String> },
}

/// Role granted by a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    Reader,
    Commenter,
    Writer,
}

impl PermissionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Reader => "reader",
            PermissionRole::Commenter => "commenter",
            PermissionRole::Writer => "writer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reader" => Some(PermissionRole::Reader),
            "commenter" => Some(PermissionRole::Commenter),
            "writer" => Some(PermissionRole::Writer),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a permission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantee {
    /// Anyone holding the link
    Anyone { allow_discovery: bool },
    /// Every account in a domain
    Domain { domain: String },
    /// A single user or group
    User { email: String },
}

/// A single permission grant request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub grantee: Grantee,
    pub role: PermissionRole,
    pub send_notification: bool,
}

/// Remote storage provider contract
///
/// Covers exactly the operations the upload protocol consumes. Listing is by
/// parent membership only; callers filter by name locally.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Fetch metadata (including canonical links) for an object
    async fn get_metadata(&self, object_id: &str) -> Result<RemoteObject>;

    /// List non-trashed objects directly inside a folder
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteObject>>;

    /// Negotiate a resumable session that creates a new object in `folder_id`
    ///
    /// Returns `None` when the provider answered without a session handle.
    async fn start_create_session(
        &self,
        folder_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>>;

    /// Negotiate a resumable session that replaces the content of an object
    async fn start_update_session(
        &self,
        object_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>>;

    /// Send one chunk of content to a session
    ///
    /// Chunks are sent in order; the chunk whose range carries a total ends
    /// the upload.
    async fn upload_chunk(
        &self,
        session_url: &str,
        descriptor: &UploadDescriptor,
        range: ChunkRange,
        chunk: Bytes,
    ) -> Result<UploadProgress>;

    /// Delete an object
    async fn delete(&self, object_id: &str) -> Result<()>;

    /// Create a permission on an object; returns the permission id
    async fn create_permission(
        &self,
        object_id: &str,
        request: &PermissionRequest,
    ) -> Result<Option<String>>;
}
