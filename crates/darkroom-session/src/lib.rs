//! Darkroom Session Tracking
//!
//! The capture-to-save pipeline core:
//! - one state machine per captured item, from placeholder allocation to
//!   final save or failure
//! - a concurrent registry of in-flight sessions
//! - ordered, asynchronous lifecycle-event fan-out to observers
//! - a single-worker background pipeline for file-based finalization and
//!   preview refresh
//! - failure messages that outlive their sessions

mod error;
mod events;
mod failures;
mod hub;
mod manager;
mod session;
mod worker;

pub use error::SessionError;
pub use events::{SessionEvent, SessionObserver};
pub use failures::FailureStore;
pub use manager::SessionManager;
pub use session::{CaptureSession, SessionInfo, SessionState};

pub type Result<T> = std::result::Result<T, SessionError>;
