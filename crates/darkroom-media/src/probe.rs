//! Image header probing
//!
//! Reads pixel dimensions straight from JPEG segment headers. No pixel
//! data is decoded; a frame header is enough.

use crate::error::MediaError;
use crate::Result;

/// Decode only the pixel dimensions of a JPEG byte stream.
pub fn jpeg_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return Err(MediaError::UnrecognizedImage(
            "missing JPEG signature".to_string(),
        ));
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return Err(MediaError::UnrecognizedImage(format!(
                "expected marker at offset {}",
                pos
            )));
        }

        let marker = bytes[pos + 1];

        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        // Standalone markers carry no length field
        if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
            pos += 2;
            continue;
        }

        // End of image before any frame header
        if marker == 0xD9 {
            break;
        }

        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > bytes.len() {
            return Err(MediaError::UnrecognizedImage(
                "truncated segment".to_string(),
            ));
        }

        if is_frame_marker(marker) {
            // Payload: precision (1), height (2), width (2)
            if len < 7 {
                return Err(MediaError::UnrecognizedImage(
                    "truncated frame header".to_string(),
                ));
            }
            let height = u16::from_be_bytes([bytes[pos + 5], bytes[pos + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[pos + 7], bytes[pos + 8]]) as u32;
            return Ok((width, height));
        }

        pos += 2 + len;
    }

    Err(MediaError::UnrecognizedImage(
        "no frame header found".to_string(),
    ))
}

// SOF0..SOF15, minus the non-frame markers sharing the range
// (DHT 0xC4, JPG 0xC8, DAC 0xCC)
fn is_frame_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        // APP0 with a 2-byte payload
        bytes.extend([0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46]);
        // SOF0: precision 8, height, width, one component
        bytes.extend([0xFF, 0xC0, 0x00, 0x0B, 0x08]);
        bytes.extend(height.to_be_bytes());
        bytes.extend(width.to_be_bytes());
        bytes.extend([0x01, 0x11, 0x00]);
        bytes
    }

    #[test]
    fn test_dimensions_from_sof0() {
        let bytes = minimal_jpeg(800, 600);
        assert_eq!(jpeg_dimensions(&bytes).unwrap(), (800, 600));
    }

    #[test]
    fn test_rejects_non_jpeg() {
        let err = jpeg_dimensions(b"PNG not really").unwrap_err();
        assert!(matches!(err, MediaError::UnrecognizedImage(_)));
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let mut bytes = minimal_jpeg(800, 600);
        bytes.truncate(8);
        assert!(jpeg_dimensions(&bytes).is_err());
    }

    #[test]
    fn test_rejects_headerless_stream() {
        // SOI immediately followed by EOI
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert!(jpeg_dimensions(&bytes).is_err());
    }
}
