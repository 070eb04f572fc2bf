//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and CI hosts
//! (macOS, Windows, Linux).
//!
//! - `HttpClient` using `reqwest`, with the uniform retry policy
//! - `FileSystemAccess` using `tokio::fs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//! use bridge_traits::RetryPolicy;
//! use std::time::Duration;
//!
//! let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(300))?
//!     .with_retry_policy(RetryPolicy::fixed(4, Duration::from_secs(2)));
//! let fs = TokioFileSystem::new();
//! ```

mod filesystem;
mod http;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
