//! Embedded image attributes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

pub const MIME_JPEG: &str = "image/jpeg";

/// Per-image embedded attributes (orientation, capture parameters)
/// carried alongside pixel data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Best-effort reader of embedded attributes from raw image bytes.
///
/// Failures are expected input, not bugs: callers log and continue with
/// [`Metadata::empty`].
pub trait MetadataReader: Send + Sync {
    fn read_metadata(&self, bytes: &[u8]) -> Result<Metadata>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_entries() {
        let mut metadata = Metadata::empty();
        assert!(metadata.is_empty());

        metadata.set("exposure", "1/125");
        metadata.set("iso", "200");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("iso"), Some("200"));
        assert_eq!(metadata.get("aperture"), None);
    }
}
