//! Capture session state machine
//!
//! One session tracks one captured item from placeholder allocation
//! through final save or failure:
//!
//! ```text
//! Created
//!   ↓ start
//! Started
//!   ↓ finalize / fail / cancel
//! Done | Failed | Cancelled
//! ```
//!
//! All mutable state sits behind a single per-session mutex, so operations
//! on one session are linearizable while sessions stay independent of each
//! other.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use darkroom_media::{
    probe, GeoPoint, MediaLocation, Metadata, NotificationHandle, Placeholder, MIME_JPEG,
};
use darkroom_storage as storage;

use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::manager::Services;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Created but not yet started; no identifier assigned
    Created,
    /// Placeholder allocated, registered, accepting progress
    Started,
    /// Finalized into a persisted media item
    Done,
    /// Finished with a recorded failure reason
    Failed,
    /// Deregistered without an outcome
    Cancelled,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Created, SessionState::Started)
                | (SessionState::Started, SessionState::Done)
                | (SessionState::Started, SessionState::Failed)
                | (SessionState::Started, SessionState::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Failed | SessionState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::Started => "started",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SessionState::Created),
            "started" => Ok(SessionState::Started),
            "done" => Ok(SessionState::Done),
            "failed" => Ok(SessionState::Failed),
            "cancelled" => Ok(SessionState::Cancelled),
            _ => Err(format!("Unknown session state: {}", s)),
        }
    }
}

struct SessionInner {
    state: SessionState,
    /// Identifier, derived from the placeholder output location on start
    id: Option<String>,
    geo: Option<GeoPoint>,
    progress_percent: u8,
    progress_message: String,
    notification: Option<NotificationHandle>,
    placeholder: Option<Placeholder>,
    final_location: Option<MediaLocation>,
}

/// Snapshot of one session for UI surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Option<String>,
    pub title: String,
    pub state: SessionState,
    pub progress_percent: u8,
    pub progress_message: String,
}

/// One in-flight capture, from the moment the photo is taken to the
/// moment its processed bytes are persisted.
pub struct CaptureSession {
    title: String,
    services: Arc<Services>,
    inner: Mutex<SessionInner>,
}

impl CaptureSession {
    pub(crate) fn new(
        services: Arc<Services>,
        title: String,
        geo: Option<GeoPoint>,
    ) -> Arc<Self> {
        Arc::new(Self {
            title,
            services,
            inner: Mutex::new(SessionInner {
                state: SessionState::Created,
                id: None,
                geo,
                progress_percent: 0,
                progress_message: String::new(),
                notification: None,
                placeholder: None,
                final_location: None,
            }),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Identifier of this session, once a placeholder has been allocated.
    pub fn id(&self) -> Option<String> {
        self.inner.lock().id.clone()
    }

    pub fn has_identifier(&self) -> bool {
        self.inner.lock().id.is_some()
    }

    pub fn geo(&self) -> Option<GeoPoint> {
        self.inner.lock().geo
    }

    pub fn set_geo(&self, geo: Option<GeoPoint>) {
        self.inner.lock().geo = geo;
    }

    pub fn final_location(&self) -> Option<MediaLocation> {
        self.inner.lock().final_location.clone()
    }

    /// Start the session with seed bytes for a fresh placeholder.
    pub fn start(self: &Arc<Self>, seed: &[u8], message: &str) -> Result<()> {
        self.begin(message, |services| {
            services
                .placeholders
                .insert_placeholder(&self.title, seed, Utc::now())
        })
    }

    /// Start the session by converting an already-persisted entry into
    /// its placeholder.
    pub fn start_from_existing(
        self: &Arc<Self>,
        existing: MediaLocation,
        message: &str,
    ) -> Result<()> {
        self.begin(message, |services| {
            services.placeholders.convert_to_placeholder(existing)
        })
    }

    fn begin<F>(self: &Arc<Self>, message: &str, allocate: F) -> Result<()>
    where
        F: FnOnce(&Services) -> darkroom_media::Result<Placeholder>,
    {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Created {
            return Err(SessionError::AlreadyStarted);
        }

        let notification = self.services.notifications.notify_start(message);
        let placeholder = match allocate(&self.services) {
            Ok(placeholder) => placeholder,
            Err(e) => {
                self.services.notifications.notify_completion(notification);
                return Err(e.into());
            }
        };

        let id = placeholder.output_location.as_str().to_string();
        inner.progress_message = message.to_string();
        inner.notification = Some(notification);
        inner.placeholder = Some(placeholder);
        inner.id = Some(id.clone());
        inner.state = SessionState::Started;

        self.services.register(&id, self);
        self.services.hub.emit(SessionEvent::Queued { id: id.clone() });

        tracing::info!(session_id = %id, title = %self.title, "Capture session started");

        Ok(())
    }

    /// Update progress, forward it to the notification surface and emit a
    /// `Progress` event. Values above 100 are clamped.
    pub fn set_progress(&self, percent: u8) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Started {
            return Err(SessionError::NotStarted);
        }
        let id = inner.id.clone().ok_or(SessionError::NotStarted)?;
        let handle = inner.notification.ok_or(SessionError::NotStarted)?;

        let percent = percent.min(100);
        inner.progress_percent = percent;
        self.services.notifications.set_progress(percent, handle);
        self.services
            .hub
            .emit(SessionEvent::Progress { id, percent });

        Ok(())
    }

    pub fn progress(&self) -> u8 {
        self.inner.lock().progress_percent
    }

    pub fn progress_message(&self) -> String {
        self.inner.lock().progress_message.clone()
    }

    /// Update the status text, forwarding it to the notification surface
    /// once one exists. No event is emitted.
    pub fn set_progress_message(&self, message: &str) {
        let mut inner = self.inner.lock();
        inner.progress_message = message.to_string();
        if let Some(handle) = inner.notification {
            self.services.notifications.set_status(message, handle);
        }
    }

    /// Convert the placeholder into a persisted media item and finish the
    /// session. Exactly one `Done` event is emitted; the session leaves
    /// the registry atomically with the transition.
    pub fn finalize(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        orientation: u16,
        metadata: &Metadata,
    ) -> Result<MediaLocation> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Started {
            return Err(SessionError::NotStarted);
        }
        let id = inner.id.clone().ok_or(SessionError::NotStarted)?;
        let handle = inner.notification.ok_or(SessionError::NotStarted)?;
        let placeholder = inner.placeholder.clone().ok_or(SessionError::NotStarted)?;

        let final_location = self.services.placeholders.finalize_placeholder(
            &placeholder,
            inner.geo,
            orientation,
            metadata,
            bytes,
            width,
            height,
            MIME_JPEG,
        )?;

        inner.final_location = Some(final_location.clone());
        inner.state = SessionState::Done;
        self.services.notifications.notify_completion(handle);
        self.services.deregister(&id);
        self.services.hub.emit(SessionEvent::Done {
            id: id.clone(),
            final_location: final_location.clone(),
        });

        tracing::info!(session_id = %id, location = %final_location, "Capture session finalized");

        Ok(final_location)
    }

    /// Finish the session with a failure: the reason is recorded in the
    /// failure store under this session's identifier and a `Failed` event
    /// is emitted.
    pub fn fail(&self, reason: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Started {
            return Err(SessionError::NotStarted);
        }
        let id = inner.id.clone().ok_or(SessionError::NotStarted)?;
        let handle = inner.notification.ok_or(SessionError::NotStarted)?;

        inner.progress_message = reason.to_string();
        inner.state = SessionState::Failed;
        self.services.notifications.notify_completion(handle);
        self.services.deregister(&id);
        self.services.failures.record(&id, reason);
        self.services.hub.emit(SessionEvent::Failed {
            id: id.clone(),
            reason: reason.to_string(),
        });

        tracing::warn!(session_id = %id, reason = %reason, "Capture session failed");

        Ok(())
    }

    /// Stop tracking the session. No event is emitted and the placeholder
    /// is left to its owner; already-queued background work becomes a
    /// no-op. Harmless on a session that is not started.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Started {
            return;
        }
        if let Some(id) = inner.id.clone() {
            inner.state = SessionState::Cancelled;
            self.services.deregister(&id);
            tracing::info!(session_id = %id, "Capture session cancelled");
        }
    }

    /// Compute the path of this session's temp capture file without
    /// touching the filesystem below the temp root.
    pub fn temp_file_path(&self) -> Result<PathBuf> {
        self.require_identifier()?;
        Ok(storage::temp_file_path(
            self.services.storage.as_ref(),
            &self.title,
        )?)
    }

    /// Create the temp capture file (and its directory chain) if absent
    /// and return its path.
    pub fn ensure_temp_file(&self) -> Result<PathBuf> {
        self.require_identifier()?;
        Ok(storage::ensure_temp_file(
            self.services.storage.as_ref(),
            &self.title,
        )?)
    }

    /// Finalize from the bytes staged in the temp capture file.
    ///
    /// Runs on the background worker so the caller is never blocked on
    /// I/O. Pixel dimensions are probed from the JPEG header; metadata is
    /// read best-effort and an unreadable temp file fails the session
    /// with an I/O reason.
    pub fn finalize_from_temp_file(self: &Arc<Self>) -> Result<()> {
        let path = self.temp_file_path()?;
        let session = Arc::clone(self);
        self.services
            .queue
            .submit(move || session.run_file_finalize(&path));
        Ok(())
    }

    /// Re-read the temp capture file and refresh the placeholder preview,
    /// emitting an `Updated` event. May be called any number of times
    /// while the session is started.
    pub fn update_preview(self: &Arc<Self>) -> Result<()> {
        let path = self.temp_file_path()?;
        let session = Arc::clone(self);
        self.services
            .queue
            .submit(move || session.run_preview_update(&path));
        Ok(())
    }

    fn run_file_finalize(&self, path: &Path) -> Result<()> {
        if self.state() != SessionState::Started {
            tracing::debug!(title = %self.title, "Skipping queued finalize; session no longer active");
            return Ok(());
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return self.fail_from_background(&format!("cannot read capture data: {}", e))
            }
        };

        let (width, height) = match probe::jpeg_dimensions(&bytes) {
            Ok(dimensions) => dimensions,
            Err(e) => {
                return self.fail_from_background(&format!("unusable capture data: {}", e))
            }
        };

        let metadata = match self.services.metadata.read_metadata(&bytes) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(title = %self.title, error = %e, "Could not read capture metadata");
                Metadata::empty()
            }
        };

        match self.finalize(&bytes, width, height, 0, &metadata) {
            Ok(_) => Ok(()),
            // The session left Started while the task was queued
            Err(SessionError::NotStarted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn run_preview_update(&self, path: &Path) -> Result<()> {
        // The temp file may be mid-write while previews refresh; skip this
        // round and let the next one retry.
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(title = %self.title, error = %e, "Preview refresh skipped; temp file unreadable");
                return Ok(());
            }
        };
        let (width, height) = match probe::jpeg_dimensions(&bytes) {
            Ok(dimensions) => dimensions,
            Err(e) => {
                tracing::debug!(title = %self.title, error = %e, "Preview refresh skipped; data not decodable");
                return Ok(());
            }
        };

        let inner = self.inner.lock();
        if inner.state != SessionState::Started {
            return Ok(());
        }
        let (id, placeholder) = match (inner.id.clone(), inner.placeholder.clone()) {
            (Some(id), Some(placeholder)) => (id, placeholder),
            _ => return Ok(()),
        };

        self.services
            .placeholders
            .replace_placeholder(&placeholder, &bytes, width, height)?;
        self.services.hub.emit(SessionEvent::Updated { id });

        Ok(())
    }

    // A queued task may find its session already cancelled or finished;
    // that is not an error.
    fn fail_from_background(&self, reason: &str) -> Result<()> {
        match self.fail(reason) {
            Ok(()) | Err(SessionError::NotStarted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn require_identifier(&self) -> Result<()> {
        if self.inner.lock().id.is_none() {
            return Err(SessionError::NotStarted);
        }
        Ok(())
    }

    pub fn info(&self) -> SessionInfo {
        let inner = self.inner.lock();
        SessionInfo {
            id: inner.id.clone(),
            title: self.title.clone(),
            state: inner.state,
            progress_percent: inner.progress_percent,
            progress_message: inner.progress_message.clone(),
        }
    }
}
