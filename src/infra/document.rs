//! Reading and writing converted Markdown documents.

use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors reading or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: PathBuf, encoding: String },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => DocumentError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => {
                DocumentError::PermissionDenied { path: path.into() }
            }
            _ => DocumentError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Reads a document as UTF-8 text.
///
/// # Errors
///
/// Returns `DocumentError::NotFound` if the file doesn't exist.
/// Returns `DocumentError::InvalidEncoding` if the bytes are not usable UTF-8 text.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path).map_err(|e| DocumentError::from_io(path, e))?;
    decode_document(bytes, path)
}

/// Decodes raw document bytes.
///
/// A UTF-8 byte order mark is stripped and CRLF line endings become LF.
/// UTF-16 input, invalid UTF-8, and CR-only line endings are rejected: the
/// rewrite rules are line based and would silently do nothing on such input.
/// A carriage return inside an LF-terminated line (progress bar output) is
/// kept as is.
pub fn decode_document(bytes: Vec<u8>, path: &Path) -> Result<String, DocumentError> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(DocumentError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 byte order mark detected; convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| DocumentError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    let content = match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    };

    if content.contains('\r') && !content.contains('\n') {
        return Err(DocumentError::InvalidEncoding {
            path: path.into(),
            encoding: "CR-only line endings detected; convert to LF".into(),
        });
    }

    if content.contains("\r\n") {
        Ok(content.replace("\r\n", "\n"))
    } else {
        Ok(content)
    }
}

/// Writes a document atomically (temp file in the same directory, then rename).
///
/// # Errors
///
/// Returns `DocumentError::NotFound` if the parent directory doesn't exist.
/// Returns `DocumentError::AtomicWrite` if the rename fails.
pub fn write_document(path: &Path, content: &str) -> Result<(), DocumentError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if !parent.is_dir() {
        return Err(DocumentError::NotFound {
            path: parent.into(),
        });
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| DocumentError::Io {
        path: path.into(),
        source: e,
    })?;

    temp.write_all(content.as_bytes())
        .map_err(|e| DocumentError::Io {
            path: path.into(),
            source: e,
        })?;

    temp.persist(path).map_err(|e| DocumentError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    Ok(())
}
