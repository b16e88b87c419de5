//! File intake for prompt attachments.
//!
//! Reads a user-selected file, tags it with a media type, enforces the
//! size cap, and base64-encodes the contents for the wire.

use base64::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hard cap on attachment size. Larger files are rejected before they
/// reach the dispatcher.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("File size exceeds 10MB limit.")]
    TooLarge { size_bytes: u64 },
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Could not process file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// A file staged in the input bar, waiting to be sent with the next
/// prompt. Consumed exactly once on submit; discarded on removal.
#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub file_name: String,
    pub path: PathBuf,
    pub media_type: String,
    /// Raw file contents, base64-encoded.
    pub data: String,
    pub size_bytes: u64,
}

impl PendingAttachment {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Decode the payload back to raw bytes (for preview rendering).
    pub fn bytes(&self) -> Option<Vec<u8>> {
        BASE64_STANDARD.decode(&self.data).ok()
    }
}

/// Media type for a file by extension, or `None` for kinds the input
/// bar does not accept.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    let media_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" | "md" => "text/plain",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(media_type)
}

/// Stage a file from disk. The size check runs against metadata so an
/// oversized file is never read into memory.
pub fn load_attachment(path: &Path) -> Result<PendingAttachment, AttachmentError> {
    let media_type = media_type_for(path).ok_or_else(|| {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string();
        AttachmentError::UnsupportedType(ext)
    })?;

    let size_bytes = fs::metadata(path)?.len();
    if size_bytes > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge { size_bytes });
    }

    let bytes = fs::read(path)?;
    Ok(PendingAttachment {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string()),
        path: path.to_path_buf(),
        media_type: media_type.to_string(),
        data: BASE64_STANDARD.encode(&bytes),
        size_bytes,
    })
}

/// Build a self-contained locator embedding base64 content.
pub fn encode_data_uri(media_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", media_type, base64_data)
}

/// Split a data URI back into its media type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (media_type, payload) = rest.split_once(";base64,")?;
    let bytes = BASE64_STANDARD.decode(payload).ok()?;
    Some((media_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_media_type_by_extension() {
        assert_eq!(media_type_for(Path::new("cat.PNG")), Some("image/png"));
        assert_eq!(media_type_for(Path::new("notes.md")), Some("text/plain"));
        assert_eq!(
            media_type_for(Path::new("report.pdf")),
            Some("application/pdf")
        );
        assert_eq!(media_type_for(Path::new("archive.zip")), None);
        assert_eq!(media_type_for(Path::new("no_extension")), None);
    }

    #[test]
    fn test_load_attachment_encodes_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();

        let attachment = load_attachment(&path).unwrap();
        assert_eq!(attachment.media_type, "text/plain");
        assert_eq!(attachment.file_name, "hello.txt");
        assert_eq!(attachment.data, BASE64_STANDARD.encode(b"hello"));
        assert_eq!(attachment.bytes().unwrap(), b"hello");
        assert_eq!(attachment.size_bytes, 5);
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES + 1).unwrap();

        let err = load_attachment(&path).unwrap_err();
        assert!(matches!(err, AttachmentError::TooLarge { .. }));
        assert_eq!(err.to_string(), "File size exceeds 10MB limit.");
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.exe");
        fs::File::create(&path).unwrap();

        let err = load_attachment(&path).unwrap_err();
        assert!(matches!(err, AttachmentError::UnsupportedType(_)));
    }

    #[test]
    fn test_data_uri_round_trip() {
        let uri = encode_data_uri("image/png", &BASE64_STANDARD.encode(b"\x89PNG"));
        let (media_type, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(bytes, b"\x89PNG");
    }

    #[test]
    fn test_decode_rejects_non_data_uris() {
        assert!(decode_data_uri("/home/user/cat.png").is_none());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_none());
    }
}
