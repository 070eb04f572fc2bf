//! Result emission
//!
//! The summary is printed to stdout as one JSON document and, when a
//! pipeline output file is configured, appended to it as `key=value` lines.

use core_upload::{UploadResult, UploadSummary};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

#[derive(Serialize)]
struct SummaryDocument<'a> {
    results: &'a [UploadResult],
    primary: Option<&'a UploadResult>,
}

/// Render the stdout document
pub fn render_summary(summary: &UploadSummary) -> io::Result<String> {
    let document = SummaryDocument {
        results: &summary.results,
        primary: summary.primary(),
    };
    serde_json::to_string_pretty(&document).map_err(io::Error::other)
}

/// One output entry
///
/// Values spanning several lines use the `key<<DELIMITER` form, with a
/// delimiter that does not occur in the value, so they cannot inject keys.
fn output_entry(key: &str, value: &str) -> String {
    if !value.contains(['\n', '\r']) {
        return format!("{}={}", key, value);
    }

    let mut delimiter = String::from("DRIVE_UPLOAD_EOF");
    while value.contains(delimiter.as_str()) {
        delimiter.push('_');
    }
    format!("{key}<<{delimiter}\n{value}\n{delimiter}")
}

/// `key=value` lines for the primary result plus the full result list
pub fn render_outputs(summary: &UploadSummary) -> io::Result<String> {
    let mut lines = Vec::new();

    if let Some(primary) = summary.primary() {
        lines.push(output_entry("file_id", &primary.file_id));
        lines.push(output_entry("file_name", &primary.file_name));
        lines.push(output_entry("updated", &primary.updated.to_string()));
        lines.push(output_entry("skipped", &primary.skipped.to_string()));
        lines.push(output_entry("web_view_link", &primary.web_view_link));
        lines.push(output_entry("web_content_link", &primary.web_content_link));
    }

    let results = serde_json::to_string(&summary.results).map_err(io::Error::other)?;
    lines.push(output_entry("results", &results));

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    Ok(rendered)
}

/// Append outputs to `path`, creating the file if needed
pub fn append_outputs(path: &Path, summary: &UploadSummary) -> io::Result<()> {
    let rendered = render_outputs(summary)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(rendered.as_bytes())?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, updated: bool, skipped: bool) -> UploadResult {
        UploadResult {
            file_id: id.to_string(),
            file_name: format!("{}.zip", id),
            updated,
            skipped,
            web_view_link: format!("https://drive.google.com/file/d/{}/view", id),
            web_content_link: String::new(),
        }
    }

    fn summary() -> UploadSummary {
        let mut summary = UploadSummary::default();
        summary.push(result("a", false, true));
        summary.push(result("b", true, false));
        summary
    }

    #[test]
    fn test_stdout_document_has_results_and_primary() {
        let rendered = render_summary(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["primary"]["file_id"], "b");
        assert_eq!(value["primary"]["updated"], true);
    }

    #[test]
    fn test_empty_summary_has_null_primary() {
        let rendered = render_summary(&UploadSummary::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert!(value["primary"].is_null());
        assert_eq!(render_outputs(&UploadSummary::default()).unwrap(), "results=[]\n");
    }

    #[test]
    fn test_outputs_use_primary_result() {
        let rendered = render_outputs(&summary()).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "file_id=b");
        assert!(lines.contains(&"updated=true"));
        assert!(lines.contains(&"skipped=false"));
        assert!(lines.contains(&"web_content_link="));
        assert!(lines.last().unwrap().starts_with("results=[{"));
    }

    #[test]
    fn test_multiline_name_cannot_inject_keys() {
        let mut summary = UploadSummary::default();
        let mut injected = result("x", false, false);
        injected.file_name = "a.zip\nfile_id=forged\nDRIVE_UPLOAD_EOF".to_string();
        summary.push(injected);

        let rendered = render_outputs(&summary).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "file_id=x");
        assert_eq!(lines[1], "file_name<<DRIVE_UPLOAD_EOF_");
        assert_eq!(lines[2], "a.zip");
        assert_eq!(lines[3], "file_id=forged");
        assert_eq!(lines[4], "DRIVE_UPLOAD_EOF");
        assert_eq!(lines[5], "DRIVE_UPLOAD_EOF_");
        assert_eq!(lines[6], "updated=false");
        // The JSON list escapes the newline and stays on one line
        assert!(lines.last().unwrap().starts_with("results=[{"));
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "previous=1\n").unwrap();

        append_outputs(&path, &summary()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous=1\nfile_id=b\n"));
    }
}
