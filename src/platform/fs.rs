// Nexus Shell - platform/fs.rs
//
// Filesystem helpers for the window host.

use crate::util::constants::MAX_DOCUMENT_BYTES;
use crate::util::error::DocumentError;
use std::io;
use std::path::Path;

/// Read the document shown in the window.
///
/// Refuses files above `MAX_DOCUMENT_BYTES` so a wrong path cannot stall the
/// UI thread. Invalid UTF-8 is replaced rather than rejected.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DocumentError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(DocumentError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if meta.len() > MAX_DOCUMENT_BYTES {
        return Err(DocumentError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_DOCUMENT_BYTES,
        });
    }

    read_file_lossy(path).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let result = read_document(&dir.path().join("index.html"));
        assert!(matches!(result, Err(DocumentError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, [b'o', b'k', 0xff]).unwrap();
        assert_eq!(read_document(&path).unwrap(), "ok\u{fffd}");
    }

    #[test]
    fn test_oversized_document_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.html");
        let f = std::fs::File::create(&path).unwrap();
        f.set_len(MAX_DOCUMENT_BYTES + 1).unwrap();
        assert!(matches!(
            read_document(&path),
            Err(DocumentError::TooLarge { .. })
        ));
    }
}
