//! Remote folder index
//!
//! Finds same-named objects in the target folder. The provider is only asked
//! for the folder's children; the file name is matched locally so it never
//! ends up inside a query string.

use bridge_traits::storage::{RemoteObject, StorageProvider};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Result, UploadError};

pub struct RemoteFolderIndex {
    provider: Arc<dyn StorageProvider>,
}

impl RemoteFolderIndex {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Non-folder objects in `folder_id` whose name equals `file_name`
    ///
    /// Order is the provider's listing order.
    #[instrument(skip(self))]
    pub async fn lookup(&self, folder_id: &str, file_name: &str) -> Result<Vec<RemoteObject>> {
        let children = self.provider.list_children(folder_id).await.map_err(|e| {
            UploadError::Provider(format!("Failed to list folder '{}': {}", folder_id, e))
        })?;

        let matches: Vec<RemoteObject> = children
            .into_iter()
            .filter(|object| !object.is_folder && object.name == file_name)
            .collect();

        debug!("Found {} existing object(s) named '{}'", matches.len(), file_name);
        Ok(matches)
    }
}
