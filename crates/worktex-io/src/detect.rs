//! Format detection utilities.
//!
//! Detects image formats from file extensions and magic bytes. TGA has no
//! magic number, so it is only recognized by extension.

use std::fmt;
use std::path::Path;

/// Image formats known to the decode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// TIFF format.
    Tiff,
    /// Truevision TGA format.
    Tga,
}

impl ImageFormat {
    /// All known formats.
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Tiff, ImageFormat::Tga];

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("png") => Some(Self::Png),
            Some("tif") | Some("tiff") => Some(Self::Tiff),
            Some("tga") | Some("targa") => Some(Self::Tga),
            _ => None,
        }
    }

    /// Detects format from raw header bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        // PNG: 0x89 0x50 0x4E 0x47 0x0D 0x0A 0x1A 0x0A
        if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(Self::Png);
        }

        // TIFF: II (little-endian) or MM (big-endian)
        if bytes.len() >= 4
            && (bytes[0..4] == [0x49, 0x49, 0x2A, 0x00] || bytes[0..4] == [0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Tiff => "TIFF",
            Self::Tga => "TGA",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
