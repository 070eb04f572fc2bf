//! Sharing configuration
//!
//! Applies the run's [`SharingPolicy`] to a transferred file. Nothing in here
//! can fail the run: rejected or unknown grants are logged and reported as an
//! outcome value.

use bridge_traits::storage::StorageProvider;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::types::{SharingMode, SharingOutcome, SharingPolicy};

pub struct SharingConfigurator {
    provider: Arc<dyn StorageProvider>,
}

impl SharingConfigurator {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    #[instrument(skip(self, policy))]
    pub async fn apply(&self, policy: &SharingPolicy, remote_id: &str) -> SharingOutcome {
        if let SharingMode::Unrecognized(raw) = &policy.mode {
            warn!("Unknown sharing mode '{}', file left unshared", raw);
            return SharingOutcome::Skipped(format!("unknown sharing mode '{}'", raw));
        }

        let request = match policy.permission_request() {
            Some(request) => request,
            None => return SharingOutcome::NotRequested,
        };

        match self.provider.create_permission(remote_id, &request).await {
            Ok(Some(permission_id)) => {
                info!(
                    "Granted {} access ({:?}) as permission {}",
                    request.role, request.grantee, permission_id
                );
                SharingOutcome::Granted(permission_id)
            }
            Ok(None) => {
                warn!("Sharing request returned no permission id");
                SharingOutcome::Failed("no permission id returned".to_string())
            }
            Err(e) => {
                warn!("Failed to share file: {}", e);
                SharingOutcome::Failed(e.to_string())
            }
        }
    }
}
