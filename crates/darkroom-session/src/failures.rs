//! Failure messages that outlive their sessions

use std::collections::HashMap;

use parking_lot::Mutex;

/// Identifier → last failure reason, kept until explicitly cleared.
///
/// Written when a session fails; read and cleared by surfaces (for example
/// a UI dismissing an error banner) long after the session object is gone.
#[derive(Default)]
pub struct FailureStore {
    messages: Mutex<HashMap<String, String>>,
}

impl FailureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &str, reason: &str) {
        self.messages
            .lock()
            .insert(id.to_string(), reason.to_string());
    }

    pub fn has_error(&self, id: &str) -> bool {
        self.messages.lock().contains_key(id)
    }

    pub fn error_message(&self, id: &str) -> Option<String> {
        self.messages.lock().get(id).cloned()
    }

    pub fn clear_error(&self, id: &str) {
        self.messages.lock().remove(id);
    }
}
