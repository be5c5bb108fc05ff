//! Response shaping for content delivery.

use reelvault_storage::content_type::OCTET_STREAM;

/// How stored content is handed to a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Render in place with the resolved content type.
    #[default]
    Inline,
    /// Save as a file under a friendly name.
    Download,
}

/// Bytes of a video's stored object with its resolved MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContent {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Body plus the header values a transport layer needs to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredContent {
    /// Name announced in `content_disposition`
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub content_disposition: String,
    pub content_length: u64,
}

impl DeliveredContent {
    pub fn inline(content: VideoContent) -> Self {
        let content_disposition = format!("inline; filename=\"{}\"", content.key);
        Self {
            filename: content.key,
            content_length: content.bytes.len() as u64,
            content_type: content.content_type,
            content_disposition,
            bytes: content.bytes,
        }
    }

    /// Downloads always go out as `application/octet-stream`.
    pub fn download(content: VideoContent, filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            content_length: content.bytes.len() as u64,
            content_type: OCTET_STREAM.to_string(),
            content_disposition: format!("attachment; filename=\"{}\"", filename),
            bytes: content.bytes,
        }
    }
}
