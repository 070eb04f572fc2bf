//! In-memory fakes shared by the upload integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::{
    ChunkRange, FileMetadata, FileSystemAccess, PermissionRequest, RemoteObject,
    StorageProvider, UploadDescriptor, UploadProgress,
};
use bytes::Bytes;
use core_upload::{SharingPolicy, UploadContext, UploadOptions, UploadOrchestrator};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const FOLDER_ID: &str = "folder-1";

/// Small enough that multi-byte files span several upload requests
pub const CHUNK_SIZE: usize = 4;

pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

// ============================================================================
// Fake Drive
// ============================================================================

enum SessionTarget {
    Create { folder_id: String, name: String },
    Update { object_id: String, name: String },
}

struct Session {
    target: SessionTarget,
    received: Vec<u8>,
}

impl Session {
    fn new(target: SessionTarget) -> Self {
        Self {
            target,
            received: Vec::new(),
        }
    }
}

#[derive(Default)]
struct DriveState {
    objects: Vec<RemoteObject>,
    sessions: HashMap<String, Session>,
    permissions: Vec<(String, PermissionRequest)>,
    calls: Vec<String>,
    next_id: u32,
    reject_sessions: bool,
    reject_permissions: bool,
    undeletable: Vec<String>,
}

/// Storage provider keeping objects in memory
///
/// Every call is recorded by operation name so tests can assert which
/// mutations were issued.
#[derive(Default)]
pub struct FakeDrive {
    state: Mutex<DriveState>,
}

fn links(id: &str) -> (Option<String>, Option<String>) {
    (
        Some(format!("https://drive.test/file/d/{}/view", id)),
        Some(format!("https://drive.test/uc?id={}&export=download", id)),
    )
}

impl FakeDrive {
    pub fn with_folder() -> Arc<Self> {
        let drive = Self::default();
        drive.insert(RemoteObject {
            id: FOLDER_ID.to_string(),
            name: "Releases".to_string(),
            mime_type: Some("application/vnd.google-apps.folder".to_string()),
            is_folder: true,
            ..RemoteObject::default()
        });
        Arc::new(drive)
    }

    fn insert(&self, object: RemoteObject) {
        self.state.lock().unwrap().objects.push(object);
    }

    /// Seed a file in the shared folder
    pub fn seed_file(&self, id: &str, name: &str, content: &[u8]) {
        let (view, download) = links(id);
        self.insert(RemoteObject {
            id: id.to_string(),
            name: name.to_string(),
            md5_checksum: Some(md5_hex(content)),
            size: Some(content.len() as u64),
            parent_ids: vec![FOLDER_ID.to_string()],
            web_view_link: view,
            web_content_link: download,
            ..RemoteObject::default()
        });
    }

    pub fn reject_sessions(&self) {
        self.state.lock().unwrap().reject_sessions = true;
    }

    pub fn reject_permissions(&self) {
        self.state.lock().unwrap().reject_permissions = true;
    }

    pub fn trash(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(object) = state.objects.iter_mut().find(|o| o.id == id) {
            object.trashed = true;
        }
    }

    pub fn make_undeletable(&self, id: &str) {
        self.state.lock().unwrap().undeletable.push(id.to_string());
    }

    pub fn files_named(&self, name: &str) -> Vec<RemoteObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|o| o.name == name && !o.is_folder)
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn permissions(&self) -> Vec<(String, PermissionRequest)> {
        self.state.lock().unwrap().permissions.clone()
    }

    fn record(&self, operation: &str) {
        self.state.lock().unwrap().calls.push(operation.to_string());
    }
}

#[async_trait]
impl StorageProvider for FakeDrive {
    async fn get_metadata(&self, object_id: &str) -> Result<RemoteObject> {
        self.record("get_metadata");
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .find(|o| o.id == object_id)
            .cloned()
            .ok_or_else(|| BridgeError::Http {
                status: 404,
                message: format!("File not found: {}", object_id),
            })
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteObject>> {
        self.record("list_children");
        Ok(self
            .state
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|o| !o.trashed && o.parent_ids.iter().any(|p| p == folder_id))
            .cloned()
            .collect())
    }

    async fn start_create_session(
        &self,
        folder_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>> {
        self.record("start_create_session");
        let mut state = self.state.lock().unwrap();
        if state.reject_sessions {
            return Err(BridgeError::Http {
                status: 403,
                message: "storage quota exceeded".to_string(),
            });
        }
        let url = format!("https://upload.test/session/{}", state.sessions.len());
        state.sessions.insert(
            url.clone(),
            Session::new(SessionTarget::Create {
                folder_id: folder_id.to_string(),
                name: descriptor.name.clone(),
            }),
        );
        Ok(Some(url))
    }

    async fn start_update_session(
        &self,
        object_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>> {
        self.record("start_update_session");
        let mut state = self.state.lock().unwrap();
        if state.reject_sessions {
            return Err(BridgeError::Http {
                status: 403,
                message: "storage quota exceeded".to_string(),
            });
        }
        let url = format!("https://upload.test/session/{}", state.sessions.len());
        state.sessions.insert(
            url.clone(),
            Session::new(SessionTarget::Update {
                object_id: object_id.to_string(),
                name: descriptor.name.clone(),
            }),
        );
        Ok(Some(url))
    }

    async fn upload_chunk(
        &self,
        session_url: &str,
        _descriptor: &UploadDescriptor,
        range: ChunkRange,
        chunk: Bytes,
    ) -> Result<UploadProgress> {
        self.record("upload_chunk");
        let mut state = self.state.lock().unwrap();
        let session = state
            .sessions
            .get_mut(session_url)
            .ok_or_else(|| BridgeError::OperationFailed("unknown session".to_string()))?;

        if range.offset != session.received.len() as u64 || range.len != chunk.len() as u64 {
            return Err(BridgeError::Http {
                status: 400,
                message: format!("unexpected range {}", range.content_range()),
            });
        }
        session.received.extend_from_slice(&chunk);

        if !range.is_final() {
            return Ok(UploadProgress::Incomplete {
                received: session.received.len() as u64,
            });
        }

        let Some(session) = state.sessions.remove(session_url) else {
            return Err(BridgeError::OperationFailed("unknown session".to_string()));
        };
        let content = session.received;
        let checksum = md5_hex(&content);

        let object_id = match session.target {
            SessionTarget::Create { folder_id, name } => {
                state.next_id += 1;
                let id = format!("new-{}", state.next_id);
                let (view, download) = links(&id);
                state.objects.push(RemoteObject {
                    id: id.clone(),
                    name,
                    md5_checksum: Some(checksum),
                    size: Some(content.len() as u64),
                    parent_ids: vec![folder_id],
                    web_view_link: view,
                    web_content_link: download,
                    ..RemoteObject::default()
                });
                id
            }
            SessionTarget::Update { object_id, name } => {
                let object = state
                    .objects
                    .iter_mut()
                    .find(|o| o.id == object_id)
                    .ok_or_else(|| BridgeError::Http {
                        status: 404,
                        message: "gone".to_string(),
                    })?;
                object.name = name;
                object.md5_checksum = Some(checksum);
                object.size = Some(content.len() as u64);
                object_id
            }
        };

        Ok(UploadProgress::Complete {
            object_id: Some(object_id),
        })
    }

    async fn delete(&self, object_id: &str) -> Result<()> {
        self.record("delete");
        let mut state = self.state.lock().unwrap();
        if state.undeletable.iter().any(|id| id == object_id) {
            return Err(BridgeError::Http {
                status: 403,
                message: "insufficient permissions".to_string(),
            });
        }
        state.objects.retain(|o| o.id != object_id);
        Ok(())
    }

    async fn create_permission(
        &self,
        object_id: &str,
        request: &PermissionRequest,
    ) -> Result<Option<String>> {
        self.record("create_permission");
        let mut state = self.state.lock().unwrap();
        if state.reject_permissions {
            return Err(BridgeError::Http {
                status: 403,
                message: "sharing outside the domain is disabled".to_string(),
            });
        }
        state
            .permissions
            .push((object_id.to_string(), request.clone()));
        Ok(Some(format!("perm-{}", state.permissions.len())))
    }
}

// ============================================================================
// Fake file system
// ============================================================================

#[derive(Default)]
pub struct FakeFs {
    files: Mutex<HashMap<PathBuf, Bytes>>,
}

impl FakeFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn write(&self, path: &str, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), Bytes::copy_from_slice(content));
    }

    fn get(&self, path: &Path) -> Result<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                BridgeError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.display().to_string(),
                ))
            })
    }
}

#[async_trait]
impl FileSystemAccess for FakeFs {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let content = self.get(path)?;
        Ok(FileMetadata {
            size: content.len() as u64,
            modified_at: None,
            is_directory: false,
        })
    }

    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Bytes> {
        let content = self.get(path)?;
        Ok(content.slice(..len.min(content.len())))
    }

    async fn open_read_stream(
        &self,
        path: &Path,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let content = self.get(path)?;
        Ok(Box::new(std::io::Cursor::new(content.to_vec())))
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn orchestrator(
    drive: &Arc<FakeDrive>,
    fs: &Arc<FakeFs>,
    overwrite: bool,
    sharing: SharingPolicy,
) -> UploadOrchestrator {
    let options = UploadOptions {
        folder_id: FOLDER_ID.to_string(),
        overwrite,
        sharing,
        chunk_size: CHUNK_SIZE,
    };
    UploadOrchestrator::new(UploadContext::new(drive.clone(), fs.clone(), options))
}

/// Orchestrator targeting an arbitrary folder id with default options
pub fn orchestrator_in(
    drive: &Arc<FakeDrive>,
    fs: &Arc<FakeFs>,
    folder_id: &str,
) -> UploadOrchestrator {
    let options = UploadOptions {
        folder_id: folder_id.to_string(),
        overwrite: true,
        sharing: SharingPolicy::default(),
        chunk_size: CHUNK_SIZE,
    };
    UploadOrchestrator::new(UploadContext::new(drive.clone(), fs.clone(), options))
}

pub fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(|p| PathBuf::from(*p)).collect()
}
