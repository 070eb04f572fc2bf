//! # Run Configuration
//!
//! Holds every input of a single upload run. The configuration is assembled
//! through [`UploadConfigBuilder`] (usually from CLI flags and environment
//! variables) and validated fail-fast before any network call is made.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::UploadConfig;
//!
//! let config = UploadConfig::builder()
//!     .file_selector("dist/*.zip")
//!     .folder_id("1AbCdEf")
//!     .credentials(std::env::var("DRIVE_UPLOAD_CREDENTIALS")?)
//!     .overwrite(true)
//!     .build()?;
//! ```
//!
//! Sharing settings are carried as the raw strings the user supplied; the
//! upload core turns them into a typed policy and rejects inconsistent
//! combinations (e.g. domain sharing without a domain) before authenticating.

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on attempts per provider call
const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Granularity Drive requires for every chunk except the last
pub const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Upper bound on the upload chunk size
const MAX_CHUNK_SIZE: usize = 1024 * 1024 * 1024;

/// Raw sharing settings as provided by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingSettings {
    /// `none`, `anyone`, `domain` or `specific`
    pub mode: String,
    /// `reader`, `commenter` or `writer`
    pub role: String,
    /// Principal for `specific` mode
    pub email: Option<String>,
    /// Domain for `domain` mode
    pub domain: Option<String>,
    /// Whether link-shared files appear in search (`anyone` mode only)
    pub allow_discovery: bool,
}

impl Default for SharingSettings {
    fn default() -> Self {
        Self {
            mode: "none".to_string(),
            role: "reader".to_string(),
            email: None,
            domain: None,
            allow_discovery: false,
        }
    }
}

/// Transport settings applied uniformly to every provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Attempts per call, including the first one
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Maximum duration of a single call
    pub request_timeout: Duration,
    /// Bytes sent per upload request; also bounds the content held in memory
    pub upload_chunk_size: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            retry_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(300),
            upload_chunk_size: 8 * 1024 * 1024,
        }
    }
}

/// Configuration of one upload run
#[derive(Debug)]
pub struct UploadConfig {
    /// Glob pattern or newline-separated list of paths
    pub file_selector: String,
    /// Target remote folder id
    pub folder_id: String,
    /// Base64-encoded service-account key
    pub credentials: SecretString,
    /// Replace or update same-named remote files
    pub overwrite: bool,
    pub sharing: SharingSettings,
    pub network: NetworkSettings,
    /// File receiving `key=value` outputs for later pipeline steps
    pub output_file: Option<PathBuf>,
}

impl UploadConfig {
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.file_selector.trim().is_empty() {
            return Err(Error::Config(
                "File selector is required (glob pattern or newline-separated paths)".to_string(),
            ));
        }

        if self.folder_id.trim().is_empty() {
            return Err(Error::Config("Folder id is required".to_string()));
        }

        if self.credentials.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "Service account credentials are required".to_string(),
            ));
        }

        if self.network.max_attempts == 0 || self.network.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(Error::Config(format!(
                "Max attempts must be between 1 and {}",
                MAX_ATTEMPTS_LIMIT
            )));
        }

        if self.network.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        let chunk_size = self.network.upload_chunk_size;
        if chunk_size == 0 || chunk_size % CHUNK_ALIGNMENT != 0 || chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "Upload chunk size must be a non-zero multiple of {} KiB up to {} MiB",
                CHUNK_ALIGNMENT / 1024,
                MAX_CHUNK_SIZE / (1024 * 1024)
            )));
        }

        Ok(())
    }
}

/// Builder for [`UploadConfig`]
#[derive(Default)]
pub struct UploadConfigBuilder {
    file_selector: Option<String>,
    folder_id: Option<String>,
    credentials: Option<SecretString>,
    overwrite: Option<bool>,
    sharing: Option<SharingSettings>,
    network: Option<NetworkSettings>,
    output_file: Option<PathBuf>,
}

impl UploadConfigBuilder {
    pub fn file_selector(mut self, selector: impl Into<String>) -> Self {
        self.file_selector = Some(selector.into());
        self
    }

    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(SecretString::from(credentials.into()));
        self
    }

    /// Defaults to `true`
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn sharing(mut self, sharing: SharingSettings) -> Self {
        self.sharing = Some(sharing);
        self
    }

    pub fn network(mut self, network: NetworkSettings) -> Self {
        self.network = Some(network);
        self
    }

    pub fn output_file(mut self, path: Option<PathBuf>) -> Self {
        self.output_file = path;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<UploadConfig> {
        let file_selector = self.file_selector.ok_or_else(|| {
            Error::Config("File selector is required. Use .file_selector() to set it.".to_string())
        })?;

        let folder_id = self.folder_id.ok_or_else(|| {
            Error::Config("Folder id is required. Use .folder_id() to set it.".to_string())
        })?;

        let credentials = self.credentials.ok_or_else(|| {
            Error::Config("Credentials are required. Use .credentials() to set them.".to_string())
        })?;

        let config = UploadConfig {
            file_selector,
            folder_id: folder_id.trim().to_string(),
            credentials,
            overwrite: self.overwrite.unwrap_or(true),
            sharing: self.sharing.unwrap_or_default(),
            network: self.network.unwrap_or_default(),
            output_file: self.output_file,
        };

        config.validate()?;

        Ok(config)
    }
}

/// Parse a boolean as commonly written in pipeline variables
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("Invalid boolean value: '{}'", other))),
    }
}
