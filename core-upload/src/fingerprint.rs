//! Content fingerprinting
//!
//! The fingerprint is the lowercase hex MD5 of the file content, the same
//! digest Drive reports as `md5Checksum`.

use bridge_traits::storage::FileSystemAccess;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

const CHUNK_SIZE: usize = 256 * 1024;

pub struct ContentFingerprinter {
    fs: Arc<dyn FileSystemAccess>,
}

impl ContentFingerprinter {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self { fs }
    }

    /// Stream the file through MD5
    ///
    /// Read failures degrade to `None`, which only disables the
    /// skip-on-match shortcut for this file.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn fingerprint(&self, path: &Path) -> Option<String> {
        match self.digest(path).await {
            Ok(hex) => {
                debug!("Computed fingerprint {}", hex);
                Some(hex)
            }
            Err(e) => {
                warn!("Could not fingerprint file, content comparison disabled: {}", e);
                None
            }
        }
    }

    async fn digest(&self, path: &Path) -> std::io::Result<String> {
        let mut reader = self
            .fs
            .open_read_stream(path)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            context.consume(&buffer[..n]);
        }

        Ok(format!("{:x}", context.compute()))
    }
}
