//! Pipeline assembly

use std::sync::Arc;

use darkroom_media::{MediaSaver, MetadataReader, NotificationProvider, PlaceholderProvider};
use darkroom_session::SessionManager;
use darkroom_storage::FsSessionStorage;

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

/// Fully wired capture pipeline: filesystem session storage plus the
/// caller's media collaborators behind one session manager.
pub struct CapturePipeline {
    config: Config,
    manager: SessionManager,
}

impl CapturePipeline {
    pub fn new(
        config: Config,
        placeholders: Arc<dyn PlaceholderProvider>,
        notifications: Arc<dyn NotificationProvider>,
        saver: Arc<dyn MediaSaver>,
        metadata: Arc<dyn MetadataReader>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.session_root)?;

        let storage = Arc::new(FsSessionStorage::new(config.session_root.clone()));
        let manager = SessionManager::new(storage, placeholders, notifications, saver, metadata);

        tracing::info!(
            session_root = %config.session_root.display(),
            "Capture pipeline initialized"
        );

        Ok(Self { config, manager })
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drain in-flight background work and pending event deliveries.
    pub fn shutdown(&self) {
        self.manager.flush();
        tracing::info!("Capture pipeline drained");
    }
}

impl Clone for CapturePipeline {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            manager: self.manager.clone(),
        }
    }
}

// Implement std::io::Error conversion for fs operations
impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_media::{MemoryMediaStore, MemoryNotifier, Metadata, StaticMetadataReader};

    fn test_pipeline(root: &std::path::Path) -> CapturePipeline {
        let media = Arc::new(MemoryMediaStore::new());
        CapturePipeline::new(
            Config {
                session_root: root.join("sessions"),
            },
            media.clone(),
            Arc::new(MemoryNotifier::new()),
            media,
            Arc::new(StaticMetadataReader::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_runs_a_capture() {
        let root = tempfile::TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path());
        assert!(pipeline.config().session_root.is_dir());

        let session = pipeline.manager().create_session("IMG1", None);
        session.start(b"seed", "Saving").unwrap();
        let id = session.id().unwrap();

        session
            .finalize(b"jpeg", 800, 600, 0, &Metadata::empty())
            .unwrap();
        assert_eq!(pipeline.manager().progress(&id), None);

        pipeline.shutdown();
    }

    #[test]
    fn test_clones_share_the_manager() {
        let root = tempfile::TempDir::new().unwrap();
        let pipeline = test_pipeline(root.path());
        let clone = pipeline.clone();

        let session = clone.manager().create_session("IMG1", None);
        session.start(b"seed", "Saving").unwrap();

        assert_eq!(pipeline.manager().active_sessions().len(), 1);
    }
}
