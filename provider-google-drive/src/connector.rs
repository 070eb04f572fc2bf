//! Google Drive API connector implementation
//!
//! Implements the `StorageProvider` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{
    ChunkRange, Grantee, PermissionRequest, RemoteObject, StorageProvider, UploadDescriptor,
    UploadProgress,
};
use bytes::Bytes;
use core_auth::AccessToken;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{
    DriveFile, FileMetadataBody, FilesListResponse, IdResponse, PermissionBody, FOLDER_MIME_TYPE,
};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive upload endpoint base URL
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Fields to request for file resources
const FILE_FIELDS: &str =
    "id,name,mimeType,md5Checksum,size,parents,trashed,webViewLink,webContentLink";

/// Status a resumable session answers with while it expects more content
const RESUME_INCOMPLETE: u16 = 308;

/// Google Drive API connector
///
/// Implements `StorageProvider` for Google Drive API v3. Every call is
/// authorized with the same bearer token and sets `supportsAllDrives=true`
/// so shared drives behave like My Drive. Retries are the business of the
/// injected `HttpClient`.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::StorageProvider;
///
/// let connector = GoogleDriveConnector::new(http_client, Arc::new(token));
/// let children = connector.list_children("1AbCdEf").await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token with the `drive` scope
    access_token: Arc<AccessToken>,
}

impl GoogleDriveConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: Arc<AccessToken>) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    /// Quote a value for use inside a Drive search query string literal
    fn escape_query_value(value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "\\'")
    }

    /// Convert DriveFile to RemoteObject
    fn convert_file(drive_file: DriveFile) -> RemoteObject {
        let is_folder = drive_file.mime_type.as_deref() == Some(FOLDER_MIME_TYPE);

        RemoteObject {
            id: drive_file.id,
            name: drive_file.name,
            size: drive_file.size.and_then(|s| s.parse().ok()),
            is_folder,
            mime_type: drive_file.mime_type,
            md5_checksum: drive_file.md5_checksum.filter(|sum| !sum.is_empty()),
            parent_ids: drive_file.parents,
            trashed: drive_file.trashed,
            web_view_link: drive_file.web_view_link,
            web_content_link: drive_file.web_content_link,
        }
    }

    fn authorized(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(self.access_token.secret())
            .header("Accept", "application/json")
    }

    /// Number of bytes a session reports as persisted in its `Range` header
    /// (`bytes=0-<last>`)
    fn parse_received(range: &str) -> Option<u64> {
        let (_, last) = range.trim().strip_prefix("bytes=")?.split_once('-')?;
        last.trim().parse::<u64>().ok().map(|last| last + 1)
    }

    /// Execute a request and turn non-2xx answers into API errors
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;
        Self::check(response)
    }

    fn check(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            debug!("API request succeeded: status={}", response.status);
            return Ok(response);
        }

        warn!("API request failed: status={}", response.status);
        Err(GoogleDriveError::ApiError {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).trim().to_string(),
        }
        .into())
    }

    /// Open a resumable session and return the `Location` handle, if any
    async fn start_session(&self, request: HttpRequest) -> Result<Option<String>> {
        let response = self.send(request).await?;

        let location = response
            .header("Location")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        if location.is_none() {
            warn!("Upload session response carried no Location header");
        }

        Ok(location)
    }

    fn session_request(
        &self,
        method: HttpMethod,
        url: String,
        descriptor: &UploadDescriptor,
        body: &FileMetadataBody<'_>,
    ) -> Result<HttpRequest> {
        let mut request = self
            .authorized(method, url)
            .header("X-Upload-Content-Type", descriptor.mime_type.clone());

        if let Some(size) = descriptor.size {
            request = request.header("X-Upload-Content-Length", size.to_string());
        }

        request.json(body)
    }
}

#[async_trait]
impl StorageProvider for GoogleDriveConnector {
    #[instrument(skip(self), fields(file_id = %object_id))]
    async fn get_metadata(&self, object_id: &str) -> Result<RemoteObject> {
        debug!("Getting metadata for file: {}", object_id);

        let url = format!(
            "{}/files/{}?fields={}&supportsAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(object_id),
            FILE_FIELDS
        );

        let response = match self.send(self.authorized(HttpMethod::Get, url)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return Err(GoogleDriveError::FileNotFound {
                    file_id: object_id.to_string(),
                }
                .into())
            }
            Err(e) => return Err(e),
        };

        let drive_file: DriveFile = serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse file metadata: {}", e))
        })?;

        Ok(Self::convert_file(drive_file))
    }

    #[instrument(skip(self), fields(folder_id = %folder_id))]
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteObject>> {
        let query = format!(
            "'{}' in parents and trashed=false",
            Self::escape_query_value(folder_id)
        );

        let url = format!(
            "{}/files?q={}&pageSize={}&fields=nextPageToken,incompleteSearch,files({})\
             &supportsAllDrives=true&includeItemsFromAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(&query),
            MAX_PAGE_SIZE,
            FILE_FIELDS
        );

        let response = self.send(self.authorized(HttpMethod::Get, url)).await?;

        let list_response: FilesListResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
            })?;

        if list_response.next_page_token.is_some() {
            warn!(
                "Folder holds more than {} entries; only the first page is considered",
                MAX_PAGE_SIZE
            );
        }
        if list_response.incomplete_search {
            warn!("Drive reported an incomplete search; existing copies may be missed");
        }

        let files: Vec<RemoteObject> = list_response
            .files
            .into_iter()
            .filter(|f| !f.trashed)
            .map(Self::convert_file)
            .collect();

        info!("Listed {} entries from Google Drive", files.len());

        Ok(files)
    }

    #[instrument(skip(self, descriptor), fields(folder_id = %folder_id, name = %descriptor.name))]
    async fn start_create_session(
        &self,
        folder_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/files?uploadType=resumable&supportsAllDrives=true&fields={}",
            DRIVE_UPLOAD_BASE, FILE_FIELDS
        );
        let body = FileMetadataBody {
            name: &descriptor.name,
            parents: Some(vec![folder_id]),
        };

        let request = self.session_request(HttpMethod::Post, url, descriptor, &body)?;
        self.start_session(request).await
    }

    #[instrument(skip(self, descriptor), fields(file_id = %object_id, name = %descriptor.name))]
    async fn start_update_session(
        &self,
        object_id: &str,
        descriptor: &UploadDescriptor,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/files/{}?uploadType=resumable&supportsAllDrives=true&fields={}",
            DRIVE_UPLOAD_BASE,
            urlencoding::encode(object_id),
            FILE_FIELDS
        );
        let body = FileMetadataBody {
            name: &descriptor.name,
            parents: None,
        };

        let request = self.session_request(HttpMethod::Patch, url, descriptor, &body)?;
        self.start_session(request).await
    }

    #[instrument(
        skip(self, session_url, descriptor, chunk),
        fields(name = %descriptor.name, range = %range.content_range())
    )]
    async fn upload_chunk(
        &self,
        session_url: &str,
        descriptor: &UploadDescriptor,
        range: ChunkRange,
        chunk: Bytes,
    ) -> Result<UploadProgress> {
        let request = self
            .authorized(HttpMethod::Put, session_url.to_string())
            .header("Content-Type", descriptor.mime_type.clone())
            .header("Content-Range", range.content_range())
            .body(chunk);

        let response = self.http_client.execute(request).await?;

        if response.status == RESUME_INCOMPLETE {
            let received = response
                .header("Range")
                .and_then(Self::parse_received)
                .unwrap_or(0);
            debug!("Session holds {} byte(s)", received);
            return Ok(UploadProgress::Incomplete { received });
        }

        let response = Self::check(response)?;

        let completed: IdResponse = if response.body.is_empty() {
            IdResponse::default()
        } else {
            serde_json::from_slice(&response.body).map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse upload response: {}", e))
            })?
        };

        Ok(UploadProgress::Complete {
            object_id: completed.id.filter(|id| !id.is_empty()),
        })
    }

    #[instrument(skip(self), fields(file_id = %object_id))]
    async fn delete(&self, object_id: &str) -> Result<()> {
        let url = format!(
            "{}/files/{}?supportsAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(object_id)
        );

        self.send(self.authorized(HttpMethod::Delete, url)).await?;
        info!("Deleted file: {}", object_id);
        Ok(())
    }

    #[instrument(skip(self, request), fields(file_id = %object_id, role = %request.role))]
    async fn create_permission(
        &self,
        object_id: &str,
        request: &PermissionRequest,
    ) -> Result<Option<String>> {
        let mut url = format!(
            "{}/files/{}/permissions?supportsAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(object_id)
        );

        let role = request.role.as_str().to_string();
        let body = match &request.grantee {
            Grantee::Anyone { allow_discovery } => PermissionBody {
                permission_type: "anyone".to_string(),
                role,
                domain: None,
                email_address: None,
                allow_file_discovery: Some(*allow_discovery),
            },
            Grantee::Domain { domain } => PermissionBody {
                permission_type: "domain".to_string(),
                role,
                domain: Some(domain.clone()),
                email_address: None,
                allow_file_discovery: None,
            },
            Grantee::User { email } => {
                url.push_str(&format!(
                    "&sendNotificationEmail={}",
                    request.send_notification
                ));
                PermissionBody {
                    permission_type: "user".to_string(),
                    role,
                    domain: None,
                    email_address: Some(email.clone()),
                    allow_file_discovery: None,
                }
            }
        };

        let response = self
            .send(self.authorized(HttpMethod::Post, url).json(&body)?)
            .await?;

        let created: IdResponse = serde_json::from_slice(&response.body).unwrap_or_default();
        Ok(created.id)
    }
}
