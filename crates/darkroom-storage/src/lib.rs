//! Darkroom Storage Layer
//!
//! Filesystem provisioning for capture sessions: the directory-provider
//! contract consumed by the session layer, plus the on-disk layout for
//! per-capture temp files.

mod dirs;
mod error;
mod layout;

pub use dirs::{FsSessionStorage, SessionStorage};
pub use error::StorageError;
pub use layout::{ensure_temp_file, temp_file_path, TEMP_SESSIONS};

pub type Result<T> = std::result::Result<T, StorageError>;
