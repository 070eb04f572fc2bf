//! Shared mocks for unit tests

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::storage::{
    ChunkRange, FileMetadata, FileSystemAccess, PermissionRequest, RemoteObject,
    StorageProvider, UploadDescriptor, UploadProgress,
};
use bytes::Bytes;
use mockall::mock;
use std::path::Path;

mock! {
    pub Provider {}

    #[async_trait]
    impl StorageProvider for Provider {
        async fn get_metadata(&self, object_id: &str) -> Result<RemoteObject>;
        async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteObject>>;
        async fn start_create_session(
            &self,
            folder_id: &str,
            descriptor: &UploadDescriptor,
        ) -> Result<Option<String>>;
        async fn start_update_session(
            &self,
            object_id: &str,
            descriptor: &UploadDescriptor,
        ) -> Result<Option<String>>;
        async fn upload_chunk(
            &self,
            session_url: &str,
            descriptor: &UploadDescriptor,
            range: ChunkRange,
            chunk: Bytes,
        ) -> Result<UploadProgress>;
        async fn delete(&self, object_id: &str) -> Result<()>;
        async fn create_permission(
            &self,
            object_id: &str,
            request: &PermissionRequest,
        ) -> Result<Option<String>>;
    }
}

mock! {
    pub Fs {}

    #[async_trait]
    impl FileSystemAccess for Fs {
        async fn exists(&self, path: &Path) -> Result<bool>;
        async fn metadata(&self, path: &Path) -> Result<FileMetadata>;
        async fn read_prefix(&self, path: &Path, len: usize) -> Result<Bytes>;
        async fn open_read_stream(
            &self,
            path: &Path,
        ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;
    }
}
