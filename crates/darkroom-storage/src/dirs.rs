//! Session directory provisioning

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::Result;

/// Directory-provider contract consumed by the session layer.
///
/// Implementations hand out subdirectories of a session root and are
/// responsible for provisioning them on demand.
pub trait SessionStorage: Send + Sync {
    /// Return the directory for the given name, creating it if absent.
    ///
    /// Fails with [`StorageError::Unavailable`] when the backing storage
    /// cannot be provisioned.
    fn session_directory(&self, subdirectory: &str) -> Result<PathBuf>;
}

/// Filesystem-backed storage rooted at a fixed session directory.
pub struct FsSessionStorage {
    root: PathBuf,
}

impl FsSessionStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SessionStorage for FsSessionStorage {
    fn session_directory(&self, subdirectory: &str) -> Result<PathBuf> {
        if subdirectory.trim().is_empty() {
            return Err(StorageError::Unavailable(
                "subdirectory name cannot be empty".to_string(),
            ));
        }

        let dir = self.root.join(subdirectory);
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot provision {}: {}", dir.display(), e))
        })?;

        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_directory_created_on_demand() {
        let root = tempfile::TempDir::new().unwrap();
        let storage = FsSessionStorage::new(root.path());

        let dir = storage.session_directory("captures").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, root.path().join("captures"));

        // Asking again is idempotent
        let again = storage.session_directory("captures").unwrap();
        assert_eq!(dir, again);
    }

    #[test]
    fn test_empty_subdirectory_is_unavailable() {
        let root = tempfile::TempDir::new().unwrap();
        let storage = FsSessionStorage::new(root.path());

        let err = storage.session_directory("").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[test]
    fn test_unwritable_root_is_unavailable() {
        let root = tempfile::TempDir::new().unwrap();
        // A file where a directory is expected makes provisioning fail
        let blocker = root.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();

        let storage = FsSessionStorage::new(&blocker);
        let err = storage.session_directory("captures").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
