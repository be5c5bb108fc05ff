//! Content-type resolution for stored objects.
//!
//! Detection sniffs the leading bytes of the object. When the signature is
//! not recognized, the key's extension is looked up in a fixed video table.

use crate::naming::get_file_extension;

/// Bytes read from the start of an object for signature detection.
pub const SNIFF_LEN: usize = 8192;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type from magic bytes, if recognized.
pub fn detect(header: &[u8]) -> Option<&'static str> {
    infer::get(header).map(|kind| kind.mime_type())
}

/// MIME type for the extension of `name` (case-insensitive).
pub fn from_extension(name: &str) -> &'static str {
    match get_file_extension(name).to_lowercase().as_str() {
        ".mp4" => "video/mp4",
        ".avi" => "video/x-msvideo",
        ".mov" => "video/quicktime",
        ".wmv" => "video/x-ms-wmv",
        ".flv" => "video/x-flv",
        ".webm" => "video/webm",
        ".mkv" => "video/x-matroska",
        _ => OCTET_STREAM,
    }
}

/// Sniffed type when possible, extension table otherwise.
pub fn resolve(name: &str, header: &[u8]) -> String {
    detect(header)
        .unwrap_or_else(|| from_extension(name))
        .to_string()
}
