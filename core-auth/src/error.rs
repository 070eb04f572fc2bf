use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The credential blob could not be decoded or lacks required fields
    #[error("Invalid service account credential: {0}")]
    InvalidCredential(String),

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Network error during authentication: {0}")]
    NetworkError(String),

    #[error("Auth error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
