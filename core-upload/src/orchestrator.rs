//! Upload orchestration
//!
//! Drives every selected file through the reconciliation pipeline, strictly
//! one after another:
//!
//! ```text
//! Start -> Fingerprinted -> Indexed -> Decided -> {Skipped | Transferred}
//!       -> Shared -> Reported -> Done
//! ```
//!
//! Missing files and transfer failures abort the run. Sharing, cleanup and
//! link failures only produce warnings.
//!
//! ## Usage
//!
//! ```ignore
//! use core_upload::{UploadContext, UploadOptions, UploadOrchestrator};
//!
//! let context = UploadContext::new(provider, fs, options);
//! let orchestrator = UploadOrchestrator::new(context);
//! orchestrator.preflight().await?;
//! let summary = orchestrator.run(&paths).await?;
//! ```

use bridge_traits::storage::{FileSystemAccess, StorageProvider};
use bridge_traits::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::decider::decide;
use crate::error::{Result, UploadError};
use crate::index::RemoteFolderIndex;
use crate::local::LocalFileResolver;
use crate::report::ResultReporter;
use crate::sharing::SharingConfigurator;
use crate::transfer::TransferExecutor;
use crate::types::{ReconciliationDecision, SharingPolicy, UploadResult, UploadSummary};

/// Per-run options
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub folder_id: String,
    pub overwrite: bool,
    pub sharing: SharingPolicy,
    /// Bytes sent per upload request
    pub chunk_size: usize,
}

/// Everything a run needs, built once and passed explicitly
pub struct UploadContext {
    pub provider: Arc<dyn StorageProvider>,
    pub fs: Arc<dyn FileSystemAccess>,
    pub clock: Arc<dyn Clock>,
    pub options: UploadOptions,
    /// Expiry of the bearer token the provider was built with
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl UploadContext {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        fs: Arc<dyn FileSystemAccess>,
        options: UploadOptions,
    ) -> Self {
        Self {
            provider,
            fs,
            clock: Arc::new(SystemClock),
            options,
            token_expires_at: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.token_expires_at = Some(expires_at);
        self
    }
}

pub struct UploadOrchestrator {
    context: UploadContext,
    resolver: LocalFileResolver,
    index: RemoteFolderIndex,
    transfer: TransferExecutor,
    sharing: SharingConfigurator,
    reporter: ResultReporter,
}

impl UploadOrchestrator {
    pub fn new(context: UploadContext) -> Self {
        Self {
            resolver: LocalFileResolver::new(context.fs.clone()),
            index: RemoteFolderIndex::new(context.provider.clone()),
            transfer: TransferExecutor::new(context.provider.clone(), context.fs.clone())
                .with_chunk_size(context.options.chunk_size),
            sharing: SharingConfigurator::new(context.provider.clone()),
            reporter: ResultReporter::new(context.provider.clone()),
            context,
        }
    }

    pub fn context(&self) -> &UploadContext {
        &self.context
    }

    /// Check that the target folder exists, is visible, is a folder and is
    /// not in the trash
    #[instrument(skip(self), fields(folder_id = %self.context.options.folder_id))]
    pub async fn preflight(&self) -> Result<()> {
        let folder_id = &self.context.options.folder_id;

        let folder = self
            .context
            .provider
            .get_metadata(folder_id)
            .await
            .map_err(|e| UploadError::Preflight {
                folder_id: folder_id.clone(),
                reason: e.to_string(),
            })?;

        if !folder.is_folder {
            return Err(UploadError::Preflight {
                folder_id: folder_id.clone(),
                reason: format!(
                    "'{}' is not a folder ({})",
                    folder.name,
                    folder.mime_type.as_deref().unwrap_or("unknown type")
                ),
            });
        }

        if folder.trashed {
            return Err(UploadError::Preflight {
                folder_id: folder_id.clone(),
                reason: format!("'{}' is in the trash", folder.name),
            });
        }

        info!("Uploading into folder '{}'", folder.name);
        Ok(())
    }

    /// Process every path in order; stops at the first fatal error
    pub async fn run(&self, paths: &[PathBuf]) -> Result<UploadSummary> {
        let mut summary = UploadSummary::default();

        for (index, path) in paths.iter().enumerate() {
            let span = info_span!(
                "upload_file",
                file = %path.display(),
                position = index + 1,
                total = paths.len()
            );
            let result = self.process_file(path).instrument(span).await?;
            summary.push(result);
        }

        info!(
            "Processed {} file(s): {} skipped, {} updated",
            summary.len(),
            summary.results.iter().filter(|r| r.skipped).count(),
            summary.results.iter().filter(|r| r.updated).count()
        );
        Ok(summary)
    }

    async fn process_file(&self, path: &Path) -> Result<UploadResult> {
        let options = &self.context.options;
        self.warn_if_token_expired();

        let file = self.resolver.load(path).await?;
        debug!(fingerprint = ?file.fingerprint, "Fingerprinted");

        let matches = self.index.lookup(&options.folder_id, &file.name).await?;
        debug!(matches = matches.len(), "Indexed");

        let decision = decide(file.fingerprint.as_deref(), &matches, options.overwrite);
        debug!(decision = decision.label(), "Decided");

        let (file_id, updated, skipped) = match decision {
            ReconciliationDecision::Skip { existing_id } => {
                info!("'{}' is already up to date ({})", file.name, existing_id);
                (existing_id, false, true)
            }
            ReconciliationDecision::UpdateInPlace { target_id } => {
                let id = self.transfer.update_in_place(&target_id, &file).await?;
                (id, true, false)
            }
            ReconciliationDecision::CreateNew => {
                let id = self.transfer.create_new(&options.folder_id, &file).await?;
                (id, false, false)
            }
            ReconciliationDecision::PurgeDuplicatesAndCreate { ids_to_delete } => {
                info!(
                    "Replacing {} existing copies of '{}'",
                    ids_to_delete.len(),
                    file.name
                );
                self.transfer.purge_duplicates(&ids_to_delete).await;
                let id = self.transfer.create_new(&options.folder_id, &file).await?;
                (id, false, false)
            }
        };

        if skipped {
            debug!("Skipped");
        } else {
            debug!(file_id = %file_id, "Transferred");
            let outcome = self.sharing.apply(&options.sharing, &file_id).await;
            debug!(outcome = ?outcome, "Shared");
        }

        let result = self
            .reporter
            .report(&file_id, &file.name, updated, skipped)
            .await;
        debug!("Reported");

        Ok(result)
    }

    fn warn_if_token_expired(&self) {
        if let Some(expires_at) = self.context.token_expires_at {
            if self.context.clock.now() >= expires_at {
                warn!(
                    "Access token expired at {}; remaining calls will likely be rejected",
                    expires_at
                );
            }
        }
    }
}
