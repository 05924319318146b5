//! Temp-session file layout
//!
//! Captures stage their in-progress bytes at
//! `<sessionRoot>/TEMP_SESSIONS/<title>/<title>.jpg`. Path computation and
//! on-disk provisioning are deliberately separate operations.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::dirs::SessionStorage;
use crate::error::StorageError;
use crate::Result;

/// Subdirectory holding per-title temp capture files.
pub const TEMP_SESSIONS: &str = "TEMP_SESSIONS";

/// Compute the temp file path for a titled capture.
///
/// Creates no per-title directory or file; only the provider's own
/// `TEMP_SESSIONS` provisioning may touch disk.
pub fn temp_file_path(storage: &dyn SessionStorage, title: &str) -> Result<PathBuf> {
    if title.trim().is_empty() {
        return Err(StorageError::Unavailable(
            "untitled captures have no temp file".to_string(),
        ));
    }

    let base = storage.session_directory(TEMP_SESSIONS)?;
    Ok(base.join(title).join(format!("{title}.jpg")))
}

/// Create the per-title directory chain and an empty temp file if absent,
/// returning the file path. Existing file contents are left untouched.
pub fn ensure_temp_file(storage: &dyn SessionStorage, title: &str) -> Result<PathBuf> {
    let path = temp_file_path(storage, title)?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().write(true).create(true).open(&path)?;

    tracing::debug!(path = %path.display(), "Ensured temp capture file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::FsSessionStorage;

    #[test]
    fn test_temp_file_path_is_pure() {
        let root = tempfile::TempDir::new().unwrap();
        let storage = FsSessionStorage::new(root.path());

        let path = temp_file_path(&storage, "IMG1").unwrap();
        assert_eq!(
            path,
            root.path().join(TEMP_SESSIONS).join("IMG1").join("IMG1.jpg")
        );
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn test_ensure_temp_file_creates_chain() {
        let root = tempfile::TempDir::new().unwrap();
        let storage = FsSessionStorage::new(root.path());

        let path = ensure_temp_file(&storage, "IMG1").unwrap();
        assert!(path.is_file());

        // A second ensure keeps existing contents
        std::fs::write(&path, b"jpeg bytes").unwrap();
        let again = ensure_temp_file(&storage, "IMG1").unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn test_untitled_capture_has_no_temp_file() {
        let root = tempfile::TempDir::new().unwrap();
        let storage = FsSessionStorage::new(root.path());

        assert!(temp_file_path(&storage, "").is_err());
        assert!(ensure_temp_file(&storage, " ").is_err());
    }
}
