//! # Google Drive Provider
//!
//! Implements `StorageProvider` for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Folder listing by parent membership (`'<folder>' in parents and trashed=false`)
//! - Resumable upload sessions for creating and updating files
//! - File deletion and permission grants
//! - Metadata lookups including canonical `webViewLink` / `webContentLink`
//!
//! Shared drives are supported on every call (`supportsAllDrives=true`).

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};
