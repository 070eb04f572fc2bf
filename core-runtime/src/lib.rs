//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the uploader:
//! - Logging and tracing infrastructure
//! - Run configuration and fail-fast validation
//!
//! Every other crate in the workspace logs through `tracing` and receives its
//! settings from [`config::UploadConfig`]; neither is held in a global beyond
//! the subscriber installed by [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
