//! Session lifecycle events and the observer contract

use serde::Serialize;

use darkroom_media::MediaLocation;

/// Lifecycle event fanned out to observers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Queued { id: String },
    Progress { id: String, percent: u8 },
    Done { id: String, final_location: MediaLocation },
    Failed { id: String, reason: String },
    Updated { id: String },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Queued { .. } => "queued",
            SessionEvent::Progress { .. } => "progress",
            SessionEvent::Done { .. } => "done",
            SessionEvent::Failed { .. } => "failed",
            SessionEvent::Updated { .. } => "updated",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SessionEvent::Queued { id }
            | SessionEvent::Progress { id, .. }
            | SessionEvent::Done { id, .. }
            | SessionEvent::Failed { id, .. }
            | SessionEvent::Updated { id } => id,
        }
    }
}

/// Observer of session lifecycle events.
///
/// Callbacks run on a single delivery thread, one event at a time and in
/// the order the producing operations completed, so implementations do not
/// need their own synchronization.
pub trait SessionObserver: Send + Sync {
    fn on_queued(&self, _id: &str) {}

    fn on_progress(&self, _id: &str, _percent: u8) {}

    fn on_done(&self, _id: &str, _final_location: &MediaLocation) {}

    fn on_failed(&self, _id: &str, _reason: &str) {}

    fn on_updated(&self, _id: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = SessionEvent::Progress {
            id: "media://pending/1".to_string(),
            percent: 40,
        };
        assert_eq!(event.kind(), "progress");
        assert_eq!(event.id(), "media://pending/1");
    }

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::Failed {
            id: "media://pending/1".to_string(),
            reason: "disk full".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["reason"], "disk full");
    }
}
