//! # Authentication Module
//!
//! Service-account authentication for the storage provider.
//!
//! ## Overview
//!
//! The uploader runs unattended, so it authenticates with a service-account
//! key instead of an interactive OAuth flow:
//!
//! 1. The base64 credential blob is decoded into a [`ServiceAccountKey`].
//! 2. A short-lived JWT assertion is signed with the key (RS256).
//! 3. The assertion is exchanged at the token endpoint for an [`AccessToken`].
//!
//! The token is acquired once per run and never refreshed. Key material and
//! tokens are held in `secrecy` wrappers and zeroized when dropped.

pub mod error;
pub mod service_account;
pub mod types;

pub use error::{AuthError, Result};
pub use service_account::{Authenticator, ServiceAccountAuthenticator, DRIVE_SCOPE};
pub use types::{AccessToken, ServiceAccountKey};
