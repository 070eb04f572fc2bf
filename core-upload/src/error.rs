use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Fatal failures of an upload run
///
/// Sharing, cleanup and link-fetch problems are never represented here; they
/// are logged as warnings and the run continues.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Folder '{folder_id}' is not usable: {reason}")]
    Preflight { folder_id: String, reason: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to start upload session for '{file_name}': {reason}")]
    TransferInit { file_name: String, reason: String },

    #[error("Failed to upload '{file_name}': {reason}")]
    TransferUpload { file_name: String, reason: String },

    #[error("Provider error: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, UploadError>;

impl From<AuthError> for UploadError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredential(msg) => {
                UploadError::Configuration(format!("Invalid credentials: {}", msg))
            }
            other => UploadError::Authentication(other.to_string()),
        }
    }
}

impl From<core_runtime::Error> for UploadError {
    fn from(error: core_runtime::Error) -> Self {
        match error {
            core_runtime::Error::Config(msg) => UploadError::Configuration(msg),
            other => UploadError::Configuration(other.to_string()),
        }
    }
}

impl From<BridgeError> for UploadError {
    fn from(error: BridgeError) -> Self {
        UploadError::Provider(error.to_string())
    }
}
