//! Session registry and manager facade
//!
//! The manager owns the shared services every session mutates: the
//! registry of in-flight sessions, the event hub, the failure store and
//! the background worker. The registry has its own lock, distinct from
//! any session's, so insert/remove/lookup never depend on a session's
//! internal locking.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use darkroom_media::{
    GeoPoint, MediaSaver, MetadataReader, NotificationProvider, PlaceholderProvider, SaveCallback,
    SaveRequest,
};
use darkroom_storage::SessionStorage;

use crate::error::SessionError;
use crate::events::SessionObserver;
use crate::failures::FailureStore;
use crate::hub::EventHub;
use crate::session::{CaptureSession, SessionInfo};
use crate::worker::SerialQueue;
use crate::Result;

pub(crate) struct Services {
    /// Weak entries: a session owns the services, never the other way
    /// around, so an abandoned session cannot keep the registry alive
    registry: RwLock<HashMap<String, Weak<CaptureSession>>>,
    pub(crate) queue: SerialQueue,
    pub(crate) hub: EventHub,
    pub(crate) failures: FailureStore,
    pub(crate) storage: Arc<dyn SessionStorage>,
    pub(crate) placeholders: Arc<dyn PlaceholderProvider>,
    pub(crate) notifications: Arc<dyn NotificationProvider>,
    pub(crate) saver: Arc<dyn MediaSaver>,
    pub(crate) metadata: Arc<dyn MetadataReader>,
}

impl Services {
    pub(crate) fn register(&self, id: &str, session: &Arc<CaptureSession>) {
        let mut registry = self.registry.write();
        registry.retain(|_, entry| entry.strong_count() > 0);
        registry.insert(id.to_string(), Arc::downgrade(session));
    }

    pub(crate) fn deregister(&self, id: &str) {
        self.registry.write().remove(id);
    }

    fn lookup(&self, id: &str) -> Option<Arc<CaptureSession>> {
        self.registry.read().get(id).and_then(Weak::upgrade)
    }
}

/// Entry point for producers and observers of in-flight captures.
pub struct SessionManager {
    services: Arc<Services>,
}

impl SessionManager {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        placeholders: Arc<dyn PlaceholderProvider>,
        notifications: Arc<dyn NotificationProvider>,
        saver: Arc<dyn MediaSaver>,
        metadata: Arc<dyn MetadataReader>,
    ) -> Self {
        tracing::info!("Session manager initialized");

        Self {
            services: Arc::new(Services {
                registry: RwLock::new(HashMap::new()),
                queue: SerialQueue::new(),
                hub: EventHub::new(),
                failures: FailureStore::new(),
                storage,
                placeholders,
                notifications,
                saver,
                metadata,
            }),
        }
    }

    /// Create a session for a titled capture. Not yet registered; call
    /// [`CaptureSession::start`] to allocate its placeholder.
    pub fn create_session(
        &self,
        title: impl Into<String>,
        geo: Option<GeoPoint>,
    ) -> Arc<CaptureSession> {
        CaptureSession::new(Arc::clone(&self.services), title.into(), geo)
    }

    /// Create a session with no title and no location.
    pub fn create_anonymous_session(&self) -> Arc<CaptureSession> {
        self.create_session("", None)
    }

    /// Progress of the started session holding this identifier, or `None`
    /// when no such session exists ("unknown" is not an error).
    pub fn progress(&self, id: &str) -> Option<u8> {
        let session = self.services.lookup(id)?;
        Some(session.progress())
    }

    /// Status text of the started session holding this identifier.
    pub fn progress_message(&self, id: &str) -> Result<String> {
        let session = self
            .services
            .lookup(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))?;
        Ok(session.progress_message())
    }

    /// The started session holding this identifier, if any.
    pub fn session(&self, id: &str) -> Option<Arc<CaptureSession>> {
        self.services.lookup(id)
    }

    /// Snapshots of every session currently in flight.
    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        let sessions: Vec<_> = self
            .services
            .registry
            .read()
            .values()
            .filter_map(Weak::upgrade)
            .collect();
        sessions.iter().map(|session| session.info()).collect()
    }

    /// Storage directory for the given subdirectory name.
    pub fn session_directory(&self, subdirectory: &str) -> Result<PathBuf> {
        Ok(self.services.storage.session_directory(subdirectory)?)
    }

    /// Persist an already-finished image directly, bypassing the session
    /// and placeholder flow entirely.
    pub fn save_image(&self, request: SaveRequest, on_saved: Option<SaveCallback>) -> Result<()> {
        Ok(self.services.saver.add_image(request, on_saved)?)
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionObserver>) {
        self.services.hub.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn SessionObserver>) {
        self.services.hub.remove_listener(listener);
    }

    pub fn has_error(&self, id: &str) -> bool {
        self.services.failures.has_error(id)
    }

    pub fn error_message(&self, id: &str) -> Option<String> {
        self.services.failures.error_message(id)
    }

    pub fn clear_error(&self, id: &str) {
        self.services.failures.clear_error(id)
    }

    /// Drain the background worker, then the event delivery queue. After
    /// this returns, every effect of previously submitted work is visible
    /// and every previously emitted event has been delivered.
    pub fn flush(&self) {
        self.services.queue.flush();
        self.services.hub.flush();
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
        }
    }
}
