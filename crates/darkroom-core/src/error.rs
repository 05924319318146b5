//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] darkroom_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] darkroom_media::MediaError),

    #[error("Session error: {0}")]
    Session(#[from] darkroom_session::SessionError),

    #[error("Configuration error: {0}")]
    Config(String),
}
