//! Media item addressing

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::MediaError;
use crate::Result;

/// Address of a media item, provisional or final. Any URI scheme.
///
/// The string form doubles as the session identifier once a placeholder
/// has been allocated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaLocation(Url);

impl MediaLocation {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|e| MediaError::InvalidLocation(format!("{}: {}", input, e)))?;
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for MediaLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MediaLocation {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Geospatial tag recorded at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_scheme() {
        let location = MediaLocation::parse("media://pending/42").unwrap();
        assert_eq!(location.as_str(), "media://pending/42");
        assert_eq!(location.to_string(), "media://pending/42");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = MediaLocation::parse("not a uri").unwrap_err();
        assert!(matches!(err, MediaError::InvalidLocation(_)));
    }

    #[test]
    fn test_serde_round_trip() {
        let location = MediaLocation::parse("media://item/7").unwrap();
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"media://item/7\"");
        let back: MediaLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
    }
}
