//! Darkroom Core
//!
//! Coordination layer for the capture-to-save pipeline: configuration,
//! logging setup, and assembly of filesystem storage plus the caller's
//! media collaborators into one session manager.

mod config;
mod error;
mod pipeline;

pub use config::Config;
pub use error::CoreError;
pub use pipeline::CapturePipeline;

// Re-export pipeline components
pub use darkroom_media::{
    GeoPoint, MediaError, MediaLocation, MediaSaver, MemoryMediaStore, MemoryNotifier, Metadata,
    MetadataReader, NotificationHandle, NotificationProvider, Placeholder, PlaceholderProvider,
    SaveCallback, SaveRequest, MIME_JPEG,
};
pub use darkroom_session::{
    CaptureSession, FailureStore, SessionError, SessionEvent, SessionInfo, SessionManager,
    SessionObserver, SessionState,
};
pub use darkroom_storage::{FsSessionStorage, SessionStorage, StorageError, TEMP_SESSIONS};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
