//! Transfer execution
//!
//! Resumable create and in-place update, plus best-effort removal of
//! duplicate objects. Content is streamed from disk and sent in bounded
//! chunks, so at most two chunks are held in memory at a time.

use bridge_traits::storage::{
    ChunkRange, FileSystemAccess, StorageProvider, UploadDescriptor, UploadProgress,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, UploadError};
use crate::types::LocalFile;

/// Default number of bytes sent per upload request
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

pub struct TransferExecutor {
    provider: Arc<dyn StorageProvider>,
    fs: Arc<dyn FileSystemAccess>,
    chunk_size: usize,
}

fn descriptor_for(file: &LocalFile) -> UploadDescriptor {
    UploadDescriptor {
        name: file.name.clone(),
        mime_type: file.mime_type.clone(),
        size: file.size,
    }
}

/// Read up to `size` bytes; a shorter result means the content ended
async fn read_chunk<R>(reader: &mut R, size: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(size);
    (&mut *reader)
        .take(size as u64)
        .read_to_end(&mut buffer)
        .await?;
    Ok(buffer)
}

impl TransferExecutor {
    pub fn new(provider: Arc<dyn StorageProvider>, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            provider,
            fs,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Create a new object in `folder_id`; returns its id
    #[instrument(skip(self, file), fields(name = %file.name))]
    pub async fn create_new(&self, folder_id: &str, file: &LocalFile) -> Result<String> {
        let descriptor = descriptor_for(file);

        let session = self
            .provider
            .start_create_session(folder_id, &descriptor)
            .await
            .map_err(|e| init_error(file, e.to_string()))?
            .ok_or_else(|| init_error(file, "no upload session was returned".to_string()))?;

        let id = self.send_content(&session, &descriptor, file).await?;
        info!("Created '{}' as {}", file.name, id);
        Ok(id)
    }

    /// Replace the content of `remote_id`, keeping id, permissions and links
    #[instrument(skip(self, file), fields(name = %file.name))]
    pub async fn update_in_place(&self, remote_id: &str, file: &LocalFile) -> Result<String> {
        let descriptor = descriptor_for(file);

        let session = self
            .provider
            .start_update_session(remote_id, &descriptor)
            .await
            .map_err(|e| init_error(file, e.to_string()))?
            .ok_or_else(|| init_error(file, "no upload session was returned".to_string()))?;

        let id = self.send_content(&session, &descriptor, file).await?;
        if id != remote_id {
            warn!(
                "Provider reported id {} after updating {}; keeping the reported id",
                id, remote_id
            );
        }
        info!("Updated '{}' in place ({})", file.name, id);
        Ok(id)
    }

    /// Delete every id, logging failures; returns how many deletions failed
    #[instrument(skip(self))]
    pub async fn purge_duplicates(&self, ids: &[String]) -> usize {
        let mut failures = 0;

        for id in ids {
            match self.provider.delete(id).await {
                Ok(()) => debug!("Removed duplicate {}", id),
                Err(e) => {
                    failures += 1;
                    warn!("Cleanup of duplicate {} failed: {}", id, e);
                }
            }
        }

        if failures > 0 {
            warn!("{} of {} duplicate(s) could not be removed", failures, ids.len());
        }
        failures
    }

    /// Stream the file to the session chunk by chunk
    ///
    /// The next chunk is read before the current one is sent so that the
    /// chunk ending the content always carries the total size.
    async fn send_content(
        &self,
        session_url: &str,
        descriptor: &UploadDescriptor,
        file: &LocalFile,
    ) -> Result<String> {
        let read_failed =
            |e: std::io::Error| upload_error(file, format!("could not read local file: {}", e));

        let mut reader = self
            .fs
            .open_read_stream(&file.path)
            .await
            .map_err(|e| upload_error(file, format!("could not open local file: {}", e)))?;

        let mut offset = 0u64;
        let mut current = read_chunk(&mut reader, self.chunk_size)
            .await
            .map_err(read_failed)?;

        loop {
            let next = if current.len() == self.chunk_size {
                read_chunk(&mut reader, self.chunk_size)
                    .await
                    .map_err(read_failed)?
            } else {
                Vec::new()
            };

            let len = current.len() as u64;
            let range = ChunkRange {
                offset,
                len,
                total: next.is_empty().then_some(offset + len),
            };
            debug!("Sending {}", range.content_range());

            let progress = self
                .provider
                .upload_chunk(session_url, descriptor, range, Bytes::from(current))
                .await
                .map_err(|e| upload_error(file, e.to_string()))?;
            offset += len;

            match progress {
                UploadProgress::Complete { object_id } if range.is_final() => {
                    debug!("Uploaded {} byte(s)", offset);
                    return object_id.ok_or_else(|| {
                        upload_error(file, "response carried no file id".to_string())
                    });
                }
                UploadProgress::Complete { .. } => {
                    return Err(upload_error(
                        file,
                        format!(
                            "session completed after {} byte(s), before the end of the file",
                            offset
                        ),
                    ));
                }
                UploadProgress::Incomplete { received } if range.is_final() => {
                    return Err(upload_error(
                        file,
                        format!(
                            "session still incomplete after the last chunk \
                             ({} of {} byte(s) received)",
                            received, offset
                        ),
                    ));
                }
                UploadProgress::Incomplete { received } if received != offset => {
                    return Err(upload_error(
                        file,
                        format!("session holds {} byte(s) but {} were sent", received, offset),
                    ));
                }
                UploadProgress::Incomplete { .. } => {}
            }

            current = next;
        }
    }
}

fn init_error(file: &LocalFile, reason: String) -> UploadError {
    UploadError::TransferInit {
        file_name: file.name.clone(),
        reason,
    }
}

fn upload_error(file: &LocalFile, reason: String) -> UploadError {
    UploadError::TransferUpload {
        file_name: file.name.clone(),
        reason,
    }
}
