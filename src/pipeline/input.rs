//! Input resolution: turn a local path or an in-memory buffer into a
//! [`SourceDocument`] ready for upload.
//!
//! The backend needs three things before it can issue an upload slot: a file
//! name, a MIME type, and the bytes themselves. The MIME type is inferred
//! from the file extension; unknown extensions upload as
//! `application/octet-stream` and the backend sniffs them itself.

use crate::error::Doc2MdError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A document ready to be uploaded.
#[derive(Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SourceDocument {
    /// Build a document from a buffer, inferring the MIME type from `filename`.
    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename);
        Self {
            filename,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Override the inferred MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reject documents the backend would refuse, before any network call.
    pub fn validate(&self, max_file_size: u64) -> Result<(), Doc2MdError> {
        if self.is_empty() {
            return Err(Doc2MdError::EmptyFile {
                filename: self.filename.clone(),
            });
        }
        if self.len() > max_file_size {
            return Err(Doc2MdError::FileTooLarge {
                filename: self.filename.clone(),
                size: self.len(),
                limit: max_file_size,
            });
        }
        Ok(())
    }
}

/// MIME type for a file name, by extension.
pub fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read a local file into a [`SourceDocument`].
///
/// The size limit is checked against file metadata first so an oversize
/// file is rejected without reading it into memory.
pub async fn resolve_input(
    path: impl AsRef<Path>,
    max_file_size: u64,
) -> Result<SourceDocument, Doc2MdError> {
    let path = path.as_ref();
    let filename = display_name(path);

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| io_error(path, e))?;
    if !metadata.is_file() {
        return Err(Doc2MdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if metadata.len() > max_file_size {
        return Err(Doc2MdError::FileTooLarge {
            filename,
            size: metadata.len(),
            limit: max_file_size,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    let doc = SourceDocument::from_bytes(filename, bytes);
    doc.validate(max_file_size)?;

    debug!(
        "Resolved local file: {} ({} bytes, {})",
        path.display(),
        doc.len(),
        doc.content_type
    );
    Ok(doc)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn io_error(path: &Path, e: std::io::Error) -> Doc2MdError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => Doc2MdError::PermissionDenied { path },
        std::io::ErrorKind::NotFound => Doc2MdError::FileNotFound { path },
        _ => Doc2MdError::Internal(format!("Failed to read '{}': {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type("report.pdf"), "application/pdf");
        assert_eq!(guess_content_type("notes.TXT"), "text/plain");
        assert_eq!(
            guess_content_type("deck.pptx"),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(guess_content_type("mystery"), "application/octet-stream");
    }

    #[test]
    fn validate_rejects_empty_and_oversize() {
        let empty = SourceDocument::from_bytes("a.txt", Vec::new());
        assert!(matches!(
            empty.validate(10),
            Err(Doc2MdError::EmptyFile { .. })
        ));

        let big = SourceDocument::from_bytes("a.txt", vec![0u8; 11]);
        assert!(matches!(
            big.validate(10),
            Err(Doc2MdError::FileTooLarge { size: 11, limit: 10, .. })
        ));
        assert!(big.validate(11).is_ok());
    }

    #[test]
    fn debug_omits_bytes() {
        let doc = SourceDocument::from_bytes("a.txt", b"secret contents".to_vec());
        let dbg = format!("{doc:?}");
        assert!(!dbg.contains("secret contents"));
        assert!(dbg.contains("len: 15"));
    }

    #[tokio::test]
    async fn resolve_reads_file_and_infers_type() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        tmp.write_all(b"a,b\n1,2\n").unwrap();

        let doc = resolve_input(tmp.path(), 1024).await.unwrap();
        assert_eq!(doc.content_type, "text/csv");
        assert_eq!(doc.bytes, b"a,b\n1,2\n");
        assert!(doc.filename.ends_with(".csv"));
    }

    #[tokio::test]
    async fn resolve_missing_file() {
        let err = resolve_input("/definitely/not/here.pdf", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn resolve_checks_size_before_reading() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[7u8; 64]).unwrap();
        let err = resolve_input(tmp.path(), 63).await.unwrap_err();
        assert!(matches!(err, Doc2MdError::FileTooLarge { size: 64, .. }));
    }
}
