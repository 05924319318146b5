//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session already started")]
    AlreadyStarted,

    #[error("Session not started")]
    NotStarted,

    #[error("No active session with identifier: {0}")]
    UnknownSession(String),

    #[error("Storage error: {0}")]
    Storage(#[from] darkroom_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] darkroom_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
