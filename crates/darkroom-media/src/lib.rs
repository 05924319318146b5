//! Darkroom Media Contracts
//!
//! Shared media types and the collaborator contracts the capture pipeline
//! calls into: placeholder store, processing notifications, direct
//! persistence, and best-effort metadata reading. Also ships a JPEG header
//! probe (dimensions only, no pixel decoding) and an in-memory media store
//! used by tests across the workspace.

mod error;
mod location;
mod memory;
mod metadata;
mod notify;
mod placeholder;
pub mod probe;
mod saver;

pub use error::MediaError;
pub use location::{GeoPoint, MediaLocation};
pub use memory::{
    MemoryMediaStore, MemoryNotifier, PostedNotice, StaticMetadataReader, StoredItem,
};
pub use metadata::{Metadata, MetadataReader, MIME_JPEG};
pub use notify::{NotificationHandle, NotificationProvider};
pub use placeholder::{Placeholder, PlaceholderProvider};
pub use saver::{MediaSaver, SaveCallback, SaveRequest};

pub type Result<T> = std::result::Result<T, MediaError>;
