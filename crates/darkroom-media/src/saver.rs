//! Direct media persistence contract

use chrono::{DateTime, Utc};

use crate::location::{GeoPoint, MediaLocation};
use crate::metadata::Metadata;
use crate::Result;

/// A fully processed image to persist without going through a session.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub bytes: Vec<u8>,
    pub title: String,
    pub taken_at: DateTime<Utc>,
    pub geo: Option<GeoPoint>,
    pub width: u32,
    pub height: u32,
    pub orientation: u16,
    pub metadata: Metadata,
}

/// Invoked with the stored location once the save lands.
pub type SaveCallback = Box<dyn FnOnce(MediaLocation) + Send>;

pub trait MediaSaver: Send + Sync {
    fn add_image(&self, request: SaveRequest, on_saved: Option<SaveCallback>) -> Result<()>;
}
