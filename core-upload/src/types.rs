//! Upload domain types
//!
//! Typed records flowing through one upload pass: the local file being
//! pushed, the reconciliation decision taken for it, the sharing policy and
//! the per-file result.

use bridge_traits::storage::{Grantee, PermissionRequest, PermissionRole};
use core_runtime::config::SharingSettings;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{Result, UploadError};

/// Default MIME type when neither content nor extension identify the file
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A local file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Base name, used as the remote object name
    pub name: String,
    /// Size in bytes; `None` when the file system could not tell
    pub size: Option<u64>,
    pub mime_type: String,
    /// Lowercase hex MD5; `None` disables skip-on-match for this file
    pub fingerprint: Option<String>,
}

/// What to do with one local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationDecision {
    /// Identical content (or overwrite disabled) - no transfer
    Skip { existing_id: String },
    /// Replace the content of the single same-named object, keeping its id
    UpdateInPlace { target_id: String },
    /// No same-named object exists
    CreateNew,
    /// Delete every same-named object, then create a fresh one
    PurgeDuplicatesAndCreate { ids_to_delete: Vec<String> },
}

impl ReconciliationDecision {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationDecision::Skip { .. } => "skip",
            ReconciliationDecision::UpdateInPlace { .. } => "update",
            ReconciliationDecision::CreateNew => "create",
            ReconciliationDecision::PurgeDuplicatesAndCreate { .. } => "purge-and-create",
        }
    }
}

/// Who an uploaded file is shared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingMode {
    None,
    AnyoneWithLink,
    Domain(String),
    SpecificPrincipal(String),
    /// A mode string nobody understands; warned about and skipped
    Unrecognized(String),
}

/// Sharing policy applied to every transferred file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingPolicy {
    pub mode: SharingMode,
    pub role: PermissionRole,
    pub allow_discovery: bool,
}

impl Default for SharingPolicy {
    fn default() -> Self {
        Self {
            mode: SharingMode::None,
            role: PermissionRole::Reader,
            allow_discovery: false,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SharingPolicy {
    /// Build and validate a policy from raw settings
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Configuration`] when the role is unknown, when
    /// `domain` mode has no domain, or when `specific` mode has no email.
    pub fn from_settings(settings: &SharingSettings) -> Result<Self> {
        let role = PermissionRole::parse(&settings.role).ok_or_else(|| {
            UploadError::Configuration(format!(
                "Invalid sharing role '{}' (expected reader, commenter or writer)",
                settings.role
            ))
        })?;

        let mode = match settings.mode.trim().to_lowercase().as_str() {
            "" | "none" => SharingMode::None,
            "anyone" => SharingMode::AnyoneWithLink,
            "domain" => SharingMode::Domain(non_empty(settings.domain.as_ref()).ok_or_else(
                || UploadError::Configuration("Sharing mode 'domain' requires a domain".into()),
            )?),
            "specific" => SharingMode::SpecificPrincipal(
                non_empty(settings.email.as_ref()).ok_or_else(|| {
                    UploadError::Configuration(
                        "Sharing mode 'specific' requires an email address".into(),
                    )
                })?,
            ),
            _ => SharingMode::Unrecognized(settings.mode.clone()),
        };

        Ok(Self {
            mode,
            role,
            allow_discovery: settings.allow_discovery,
        })
    }

    pub fn is_none(&self) -> bool {
        self.mode == SharingMode::None
    }

    /// Permission request for this policy; `None` for `None`/unrecognized modes
    ///
    /// Link sharing is always read-only regardless of the configured role.
    pub fn permission_request(&self) -> Option<PermissionRequest> {
        let (grantee, role) = match &self.mode {
            SharingMode::None | SharingMode::Unrecognized(_) => return None,
            SharingMode::AnyoneWithLink => (
                Grantee::Anyone {
                    allow_discovery: self.allow_discovery,
                },
                PermissionRole::Reader,
            ),
            SharingMode::Domain(domain) => (
                Grantee::Domain {
                    domain: domain.clone(),
                },
                self.role,
            ),
            SharingMode::SpecificPrincipal(email) => (
                Grantee::User {
                    email: email.clone(),
                },
                self.role,
            ),
        };

        Some(PermissionRequest {
            grantee,
            role,
            send_notification: false,
        })
    }
}

/// Outcome of applying a sharing policy to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingOutcome {
    NotRequested,
    Granted(String),
    Skipped(String),
    Failed(String),
}

/// Result record for one processed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub file_id: String,
    pub file_name: String,
    pub updated: bool,
    pub skipped: bool,
    pub web_view_link: String,
    pub web_content_link: String,
}

/// Ordered results of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub results: Vec<UploadResult>,
}

impl UploadSummary {
    pub fn push(&mut self, result: UploadResult) {
        self.results.push(result);
    }

    /// The last processed file, exposed to single-file callers
    pub fn primary(&self) -> Option<&UploadResult> {
        self.results.last()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: &str) -> SharingSettings {
        SharingSettings {
            mode: mode.to_string(),
            ..SharingSettings::default()
        }
    }

    #[test]
    fn test_default_settings_give_no_sharing() {
        let policy = SharingPolicy::from_settings(&SharingSettings::default()).unwrap();
        assert!(policy.is_none());
        assert!(policy.permission_request().is_none());
    }

    #[test]
    fn test_domain_requires_domain() {
        let err = SharingPolicy::from_settings(&settings("domain")).unwrap_err();
        assert!(matches!(err, UploadError::Configuration(_)));

        let mut with_blank = settings("domain");
        with_blank.domain = Some("  ".to_string());
        assert!(SharingPolicy::from_settings(&with_blank).is_err());

        let mut valid = settings("Domain");
        valid.domain = Some("example.com".to_string());
        let policy = SharingPolicy::from_settings(&valid).unwrap();
        assert_eq!(policy.mode, SharingMode::Domain("example.com".to_string()));
    }

    #[test]
    fn test_specific_requires_email() {
        let err = SharingPolicy::from_settings(&settings("specific")).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_invalid_role_rejected() {
        let mut bad = settings("anyone");
        bad.role = "owner".to_string();
        let err = SharingPolicy::from_settings(&bad).unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_unrecognized_mode_is_kept() {
        let policy = SharingPolicy::from_settings(&settings("public")).unwrap();
        assert_eq!(policy.mode, SharingMode::Unrecognized("public".to_string()));
        assert!(policy.permission_request().is_none());
    }

    #[test]
    fn test_anyone_forces_reader() {
        let mut raw = settings("anyone");
        raw.role = "writer".to_string();
        raw.allow_discovery = true;
        let request = SharingPolicy::from_settings(&raw)
            .unwrap()
            .permission_request()
            .unwrap();

        assert_eq!(request.role, PermissionRole::Reader);
        assert_eq!(
            request.grantee,
            Grantee::Anyone {
                allow_discovery: true
            }
        );
    }

    #[test]
    fn test_specific_keeps_role_and_suppresses_notification() {
        let mut raw = settings("specific");
        raw.role = "commenter".to_string();
        raw.email = Some("dev@example.com".to_string());
        let request = SharingPolicy::from_settings(&raw)
            .unwrap()
            .permission_request()
            .unwrap();

        assert_eq!(request.role, PermissionRole::Commenter);
        assert!(!request.send_notification);
    }

    #[test]
    fn test_summary_primary_is_last() {
        let mut summary = UploadSummary::default();
        assert!(summary.primary().is_none());

        for id in ["a", "b"] {
            summary.push(UploadResult {
                file_id: id.to_string(),
                file_name: format!("{}.zip", id),
                updated: false,
                skipped: false,
                web_view_link: String::new(),
                web_content_link: String::new(),
            });
        }

        assert_eq!(summary.len(), 2);
        assert_eq!(summary.primary().map(|r| r.file_id.as_str()), Some("b"));
    }
}
