//! # Host Bridge Traits
//!
//! Capability traits the upload core depends on, implemented per host.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with bearer auth and retry
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Local file reads and metadata
//! - [`StorageProvider`](storage::StorageProvider) - Remote folder listing, resumable
//!   transfers, deletion and permission grants
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Implementations
//! should convert platform-specific errors to `BridgeError` and keep the HTTP status
//! when the failure came from a remote API (`BridgeError::Http`).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so they can be shared as
//! `Arc<dyn Trait>` across the run.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{
    ChunkRange, FileMetadata, FileSystemAccess, Grantee, PermissionRequest, PermissionRole,
    RemoteObject, StorageProvider, UploadDescriptor, UploadProgress,
};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
