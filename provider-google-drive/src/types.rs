//! Google Drive API request and response types
//!
//! Data structures for (de)serializing Google Drive API v3 payloads.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Google Drive API file resource
///
/// Only the fields requested through `fields=` are present; everything else
/// defaults.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: Option<String>,

    /// File size in bytes, encoded as a decimal string (absent for folders)
    pub size: Option<String>,

    /// MD5 checksum (absent for Google-native documents)
    pub md5_checksum: Option<String>,

    /// Parent folder IDs
    pub parents: Vec<String>,

    /// Link for opening the file in a browser
    pub web_view_link: Option<String>,

    /// Link for downloading the file content
    pub web_content_link: Option<String>,

    /// Whether file is trashed
    pub trashed: bool,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,

    /// Whether the search was incomplete
    #[serde(default)]
    pub incomplete_search: bool,
}

/// Metadata body sent when opening a resumable session
#[derive(Debug, Serialize)]
pub struct FileMetadataBody<'a> {
    pub name: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<&'a str>>,
}

/// Google Drive API permission resource (request body)
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionBody {
    /// `anyone`, `domain`, `user` or `group`
    #[serde(rename = "type")]
    pub permission_type: String,

    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_file_discovery: Option<bool>,
}

/// Response carrying only an `id` (permissions.create, upload completion)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdResponse {
    pub id: Option<String>,
}
