//! Local file resolution
//!
//! Turns the file selector into concrete paths and builds a [`LocalFile`]
//! record (name, size, MIME type, fingerprint) for each of them.

use bridge_traits::storage::FileSystemAccess;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{Result, UploadError};
use crate::fingerprint::ContentFingerprinter;
use crate::types::{LocalFile, FALLBACK_MIME_TYPE};

/// Bytes inspected for magic-number sniffing
const SNIFF_LEN: usize = 16;

const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

pub struct LocalFileResolver {
    fs: Arc<dyn FileSystemAccess>,
    fingerprinter: ContentFingerprinter,
}

impl LocalFileResolver {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            fingerprinter: ContentFingerprinter::new(fs.clone()),
            fs,
        }
    }

    /// Expand a selector into paths
    ///
    /// A multi-line selector is a literal path list (order preserved, blank
    /// lines ignored). A single line naming an existing file is taken
    /// literally even if it contains glob metacharacters; otherwise a line
    /// with metacharacters is expanded and must match at least one regular
    /// file. Anything else is a single literal path; its existence is
    /// checked by [`Self::load`].
    pub fn resolve(&self, selector: &str) -> Result<Vec<PathBuf>> {
        if selector.contains('\n') {
            let paths: Vec<PathBuf> = selector
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect();

            if paths.is_empty() {
                return Err(UploadError::Configuration(
                    "File list contains no paths".to_string(),
                ));
            }
            return Ok(paths);
        }

        let selector = selector.trim();
        if selector.is_empty() {
            return Err(UploadError::Configuration(
                "File selector is empty".to_string(),
            ));
        }

        if !selector.contains(GLOB_METACHARACTERS) || Path::new(selector).is_file() {
            return Ok(vec![PathBuf::from(selector)]);
        }

        let entries = glob::glob(selector).map_err(|e| {
            UploadError::Configuration(format!("Invalid glob pattern '{}': {}", selector, e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(path) => debug!("Ignoring non-file match {}", path.display()),
                Err(e) => warn!("Unreadable glob match: {}", e),
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(UploadError::FileNotFound(format!(
                "no files match pattern '{}'",
                selector
            )));
        }

        debug!("Pattern '{}' matched {} file(s)", selector, paths.len());
        Ok(paths)
    }

    /// Build the [`LocalFile`] record for a path
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn load(&self, path: &Path) -> Result<LocalFile> {
        let missing = || UploadError::FileNotFound(path.display().to_string());

        if !self.fs.exists(path).await.unwrap_or(false) {
            return Err(missing());
        }

        let size = match self.fs.metadata(path).await {
            Ok(meta) if meta.is_directory => {
                return Err(UploadError::FileNotFound(format!(
                    "{} is a directory",
                    path.display()
                )))
            }
            Ok(meta) => Some(meta.size),
            Err(e) => {
                warn!("Could not read file size: {}", e);
                None
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(missing)?;

        let prefix = self.fs.read_prefix(path, SNIFF_LEN).await.unwrap_or_default();
        let mime_type = detect_mime_type(&prefix, &name);
        let fingerprint = self.fingerprinter.fingerprint(path).await;

        debug!(
            name = %name,
            size = ?size,
            mime_type = %mime_type,
            "Loaded local file"
        );

        Ok(LocalFile {
            path: path.to_path_buf(),
            name,
            size,
            mime_type,
            fingerprint,
        })
    }
}

/// Pick a MIME type from leading bytes, then from the extension
pub fn detect_mime_type(prefix: &[u8], name: &str) -> String {
    sniff_mime_type(prefix)
        .or_else(|| mime_from_extension(name))
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string()
}

fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    match &data[0..4] {
        [0x50, 0x4B, 0x03, 0x04] => Some("application/zip"),
        [0x25, 0x50, 0x44, 0x46] => Some("application/pdf"),
        [0x1F, 0x8B, _, _] => Some("application/gzip"),
        [0x89, 0x50, 0x4E, 0x47] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, _] => Some("image/jpeg"),
        [0x47, 0x49, 0x46, 0x38] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46] if data.len() >= 12 && &data[8..12] == b"WEBP" => {
            Some("image/webp")
        }
        [0x7F, 0x45, 0x4C, 0x46] => Some("application/x-executable"),
        [0x37, 0x7A, 0xBC, 0xAF] => Some("application/x-7z-compressed"),
        [0x4D, 0x5A, _, _] => Some("application/vnd.microsoft.portable-executable"),
        _ => None,
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        return Some("application/gzip");
    }

    let extension = Path::new(&lower).extension()?.to_str()?.to_string();
    let mime = match extension.as_str() {
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "7z" => "application/x-7z-compressed",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "xml" => "application/xml",
        "apk" => "application/vnd.android.package-archive",
        "dmg" => "application/x-apple-diskimage",
        "exe" => "application/vnd.microsoft.portable-executable",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => return None,
    };
    Some(mime)
}
