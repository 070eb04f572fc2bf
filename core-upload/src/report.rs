//! Result reporting
//!
//! Links are always fetched from the provider after the transfer so callers
//! get the canonical URLs rather than a templated guess.

use bridge_traits::storage::StorageProvider;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::types::UploadResult;

pub struct ResultReporter {
    provider: Arc<dyn StorageProvider>,
}

impl ResultReporter {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Assemble the result record for `file_id`
    ///
    /// A failed link lookup leaves both links empty.
    #[instrument(skip(self))]
    pub async fn report(
        &self,
        file_id: &str,
        file_name: &str,
        updated: bool,
        skipped: bool,
    ) -> UploadResult {
        let (web_view_link, web_content_link) = match self.provider.get_metadata(file_id).await {
            Ok(object) => (
                object.web_view_link.unwrap_or_default(),
                object.web_content_link.unwrap_or_default(),
            ),
            Err(e) => {
                warn!("Could not fetch links for {}: {}", file_id, e);
                (String::new(), String::new())
            }
        };

        debug!(view = %web_view_link, download = %web_content_link, "Fetched links");

        UploadResult {
            file_id: file_id.to_string(),
            file_name: file_name.to_string(),
            updated,
            skipped,
            web_view_link,
            web_content_link,
        }
    }
}
