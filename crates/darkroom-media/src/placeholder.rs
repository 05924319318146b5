//! Placeholder-store contract

use chrono::{DateTime, Utc};

use crate::location::{GeoPoint, MediaLocation};
use crate::metadata::Metadata;
use crate::Result;

/// Handle to a provisional media-store entry, shown to observers before
/// the final processed image is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub output_location: MediaLocation,
}

/// Store managing provisional entries and their promotion to persisted
/// media items.
pub trait PlaceholderProvider: Send + Sync {
    /// Insert a fresh placeholder seeded with preview bytes.
    fn insert_placeholder(
        &self,
        title: &str,
        seed: &[u8],
        taken_at: DateTime<Utc>,
    ) -> Result<Placeholder>;

    /// Convert an already-persisted entry into a placeholder.
    fn convert_to_placeholder(&self, existing: MediaLocation) -> Result<Placeholder>;

    /// Replace the placeholder's preview content.
    fn replace_placeholder(
        &self,
        placeholder: &Placeholder,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// Promote the placeholder to a persisted media item, returning the
    /// final location.
    fn finalize_placeholder(
        &self,
        placeholder: &Placeholder,
        geo: Option<GeoPoint>,
        orientation: u16,
        metadata: &Metadata,
        bytes: &[u8],
        width: u32,
        height: u32,
        mime_type: &str,
    ) -> Result<MediaLocation>;
}
