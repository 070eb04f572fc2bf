//! # Upload Reconciliation Module
//!
//! Pushes local files into a remote folder while avoiding redundant
//! transfers.
//!
//! ## Overview
//!
//! For each local file the module decides between:
//! - **Skip**: identical content is already present
//! - **Update in place**: one same-named object exists; its id, permissions
//!   and links are preserved
//! - **Create**: nothing with that name exists
//! - **Purge and create**: several same-named objects exist; all are removed
//!   and a single fresh object is created
//!
//! Transferred files then receive the configured sharing policy, and every
//! file is reported with the provider's canonical links.
//!
//! ## Components
//!
//! - **Fingerprint** (`fingerprint`): MD5 of the local content
//! - **Local files** (`local`): selector expansion, MIME detection
//! - **Folder index** (`index`): same-named objects in the target folder
//! - **Decider** (`decider`): the pure reconciliation rules
//! - **Transfer** (`transfer`): resumable create/update, duplicate purge
//! - **Sharing** (`sharing`): permission grants
//! - **Report** (`report`): link lookup and result records
//! - **Orchestrator** (`orchestrator`): preflight and per-file pipeline

pub mod decider;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod local;
pub mod orchestrator;
pub mod report;
pub mod sharing;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod test_support;

pub use decider::decide;
pub use error::{Result, UploadError};
pub use fingerprint::ContentFingerprinter;
pub use index::RemoteFolderIndex;
pub use local::{detect_mime_type, LocalFileResolver};
pub use orchestrator::{UploadContext, UploadOptions, UploadOrchestrator};
pub use report::ResultReporter;
pub use sharing::SharingConfigurator;
pub use transfer::TransferExecutor;
pub use types::{
    LocalFile, ReconciliationDecision, SharingMode, SharingOutcome, SharingPolicy, UploadResult,
    UploadSummary,
};
