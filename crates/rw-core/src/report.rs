//! Report artifact models.
//!
//! The report is an opaque blob: its bytes are relayed to the browser,
//! never parsed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Content type used when the store does not report one.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Report bytes downloaded from object storage.
#[derive(Debug, Clone)]
pub struct ReportObject {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ReportObject {
    /// Encode the report as a `data:` URI for inline embedding.
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.content_type, &self.bytes)
    }
}

/// Object metadata returned by a HEAD request.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
    pub key: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A time-limited bearer URL for the report object.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// The most recently modified report in a local folder.
#[derive(Debug, Clone, Serialize)]
pub struct LocalReport {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// How the report ends up inside the page frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    DataUri(String),
    Remote(String),
    LocalFile { file_name: String, href: String },
}

impl Embed {
    /// Value for the frame's `src` attribute.
    pub fn src(&self) -> &str {
        match self {
            Embed::DataUri(uri) => uri,
            Embed::Remote(url) => url,
            Embed::LocalFile { href, .. } => href,
        }
    }
}

/// Build a base64 `data:` URI.
pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Media type for a report file, from its extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "html" | "htm" => "text/html; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
