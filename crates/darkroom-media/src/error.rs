//! Media error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid media location: {0}")]
    InvalidLocation(String),

    #[error("Placeholder rejected: {0}")]
    Placeholder(String),

    #[error("Media store error: {0}")]
    Store(String),

    #[error("Unrecognized image data: {0}")]
    UnrecognizedImage(String),
}
