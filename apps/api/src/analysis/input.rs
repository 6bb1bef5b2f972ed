//! Request-scoped document inputs. Nothing here is persisted.

use bytes::Bytes;

/// One side of an analysis request: pasted text or an uploaded file.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    Text(String),
    File(UploadedFile),
}

/// An uploaded document as declared by the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    /// Media type exactly as declared; matched case-sensitively.
    pub media_type: String,
    pub size_bytes: u64,
    pub filename: String,
}

impl UploadedFile {
    /// Builds a file whose declared size is the payload length.
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            size_bytes: bytes.len() as u64,
            bytes,
            media_type: media_type.into(),
            filename: filename.into(),
        }
    }
}

impl DocumentInput {
    /// Short label for logs; never includes document content.
    pub fn describe(&self) -> String {
        match self {
            DocumentInput::Text(content) => format!("text ({} chars)", content.chars().count()),
            DocumentInput::File(file) => format!(
                "file '{}' ({}, {} bytes)",
                file.filename, file.media_type, file.size_bytes
            ),
        }
    }
}
