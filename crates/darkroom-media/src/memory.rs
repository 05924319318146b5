//! In-memory media store
//!
//! Reference implementations of the media contracts, used by tests across
//! the workspace and for wiring checks without a real media store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::MediaError;
use crate::location::{GeoPoint, MediaLocation};
use crate::metadata::{Metadata, MetadataReader};
use crate::notify::{NotificationHandle, NotificationProvider};
use crate::placeholder::{Placeholder, PlaceholderProvider};
use crate::saver::{MediaSaver, SaveCallback, SaveRequest};
use crate::Result;

/// One entry in the in-memory store.
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub title: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub taken_at: DateTime<Utc>,
    pub geo: Option<GeoPoint>,
    pub orientation: u16,
    pub metadata: Metadata,
    pub mime_type: Option<String>,
    pub finalized: bool,
}

/// Placeholder store and media saver backed by a map.
#[derive(Default)]
pub struct MemoryMediaStore {
    items: Mutex<HashMap<MediaLocation, StoredItem>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, location: &MediaLocation) -> Option<StoredItem> {
        self.items.lock().get(location).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn mint(prefix: &str) -> Result<MediaLocation> {
        MediaLocation::parse(&format!("media://{}/{}", prefix, Uuid::new_v4()))
    }
}

impl PlaceholderProvider for MemoryMediaStore {
    fn insert_placeholder(
        &self,
        title: &str,
        seed: &[u8],
        taken_at: DateTime<Utc>,
    ) -> Result<Placeholder> {
        let location = Self::mint("pending")?;
        self.items.lock().insert(
            location.clone(),
            StoredItem {
                title: title.to_string(),
                bytes: seed.to_vec(),
                width: 0,
                height: 0,
                taken_at,
                geo: None,
                orientation: 0,
                metadata: Metadata::empty(),
                mime_type: None,
                finalized: false,
            },
        );

        tracing::debug!(location = %location, "Inserted placeholder");

        Ok(Placeholder {
            output_location: location,
        })
    }

    fn convert_to_placeholder(&self, existing: MediaLocation) -> Result<Placeholder> {
        let mut items = self.items.lock();
        let entry = items
            .entry(existing.clone())
            .or_insert_with(|| StoredItem {
                title: String::new(),
                bytes: Vec::new(),
                width: 0,
                height: 0,
                taken_at: Utc::now(),
                geo: None,
                orientation: 0,
                metadata: Metadata::empty(),
                mime_type: None,
                finalized: false,
            });
        entry.finalized = false;

        Ok(Placeholder {
            output_location: existing,
        })
    }

    fn replace_placeholder(
        &self,
        placeholder: &Placeholder,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let mut items = self.items.lock();
        let entry = items.get_mut(&placeholder.output_location).ok_or_else(|| {
            MediaError::Placeholder(format!("unknown placeholder: {}", placeholder.output_location))
        })?;

        entry.bytes = bytes.to_vec();
        entry.width = width;
        entry.height = height;

        Ok(())
    }

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
    ) -> Result<MediaLocation> {
        let mut items = self.items.lock();
        let pending = items.remove(&placeholder.output_location).ok_or_else(|| {
            MediaError::Placeholder(format!("unknown placeholder: {}", placeholder.output_location))
        })?;

        let final_location = Self::mint("item")?;
        items.insert(
            final_location.clone(),
            StoredItem {
                title: pending.title,
                bytes: bytes.to_vec(),
                width,
                height,
                taken_at: pending.taken_at,
                geo,
                orientation,
                metadata: metadata.clone(),
                mime_type: Some(mime_type.to_string()),
                finalized: true,
            },
        );

        tracing::debug!(location = %final_location, "Finalized placeholder");

        Ok(final_location)
    }
}

impl MediaSaver for MemoryMediaStore {
    fn add_image(&self, request: SaveRequest, on_saved: Option<SaveCallback>) -> Result<()> {
        let location = Self::mint("item")?;
        self.items.lock().insert(
            location.clone(),
            StoredItem {
                title: request.title,
                bytes: request.bytes,
                width: request.width,
                height: request.height,
                taken_at: request.taken_at,
                geo: request.geo,
                orientation: request.orientation,
                metadata: request.metadata,
                mime_type: Some(crate::metadata::MIME_JPEG.to_string()),
                finalized: true,
            },
        );

        if let Some(callback) = on_saved {
            callback(location);
        }

        Ok(())
    }
}

/// One posted notification as the memory notifier saw it.
#[derive(Debug, Clone, Default)]
pub struct PostedNotice {
    pub message: String,
    pub percent: u8,
    pub completed: bool,
}

/// Notification provider recording everything it is told.
#[derive(Default)]
pub struct MemoryNotifier {
    next: AtomicU64,
    posted: Mutex<HashMap<u64, PostedNotice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self, handle: NotificationHandle) -> Option<PostedNotice> {
        self.posted.lock().get(&handle.raw()).cloned()
    }

    pub fn posted_count(&self) -> usize {
        self.posted.lock().len()
    }
}

impl NotificationProvider for MemoryNotifier {
    fn notify_start(&self, message: &str) -> NotificationHandle {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        self.posted.lock().insert(
            id,
            PostedNotice {
                message: message.to_string(),
                ..Default::default()
            },
        );
        NotificationHandle::new(id)
    }

    fn set_progress(&self, percent: u8, handle: NotificationHandle) {
        if let Some(notice) = self.posted.lock().get_mut(&handle.raw()) {
            notice.percent = percent;
        }
    }

    fn set_status(&self, message: &str, handle: NotificationHandle) {
        if let Some(notice) = self.posted.lock().get_mut(&handle.raw()) {
            notice.message = message.to_string();
        }
    }

    fn notify_completion(&self, handle: NotificationHandle) {
        if let Some(notice) = self.posted.lock().get_mut(&handle.raw()) {
            notice.completed = true;
        }
    }
}

/// Metadata reader returning a fixed result.
#[derive(Default)]
pub struct StaticMetadataReader {
    metadata: Metadata,
}

impl StaticMetadataReader {
    pub fn new(metadata: Metadata) -> Self {
        Self { metadata }
    }
}

impl MetadataReader for StaticMetadataReader {
    fn read_metadata(&self, _bytes: &[u8]) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}
