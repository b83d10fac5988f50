//! Decoder registry keyed by format tag.
//!
//! The registry is the single place where a file is matched to a decoder.
//! Selection happens once, at the boundary: magic bytes first, then the
//! file extension (TGA has no magic number). The core never branches on
//! formats.
//!
//! # Example
//!
//! ```ignore
//! use worktex_io::registry::DecoderRegistry;
//!
//! let registry = DecoderRegistry::with_builtin();
//! assert!(registry.supports_extension("png"));
//! let image = registry.decode_path("albedo.tga".as_ref())?;
//! ```

use crate::{DecodedImage, ImageFormat, IoError, IoResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decoder capability entry.
#[derive(Clone)]
pub struct DecoderInfo {
    /// Format tag this decoder handles.
    pub format: ImageFormat,
    /// Human-readable format name.
    pub name: &'static str,
    /// File extensions without dots.
    pub extensions: &'static [&'static str],
    /// Checks whether header bytes match this format.
    pub can_read: fn(&[u8]) -> bool,
    /// Decodes a complete file held in memory.
    pub decode: fn(&[u8]) -> IoResult<DecodedImage>,
}

impl std::fmt::Debug for DecoderInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderInfo")
            .field("format", &self.format)
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Registry of image decoders.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<ImageFormat, Arc<DecoderInfo>>,
    by_extension: HashMap<&'static str, ImageFormat>,
}

impl DecoderRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Creates a registry with every decoder enabled by cargo features.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtin();
        registry
    }

    fn register_builtin(&mut self) {
        #[cfg(feature = "png")]
        self.register(DecoderInfo {
            format: ImageFormat::Png,
            name: "PNG",
            extensions: &["png"],
            can_read: |h| ImageFormat::from_bytes(h) == Some(ImageFormat::Png),
            decode: crate::png::decode,
        });

        #[cfg(feature = "tiff")]
        self.register(DecoderInfo {
            format: ImageFormat::Tiff,
            name: "TIFF",
            extensions: &["tiff", "tif"],
            can_read: |h| ImageFormat::from_bytes(h) == Some(ImageFormat::Tiff),
            decode: crate::tiff::decode,
        });

        #[cfg(feature = "tga")]
        self.register(DecoderInfo {
            format: ImageFormat::Tga,
            name: "TGA",
            extensions: &["tga", "targa"],
            // no magic number
            can_read: |_| false,
            decode: crate::tga::decode,
        });
    }

    /// Registers a decoder, replacing any previous one for the same tag.
    pub fn register(&mut self, info: DecoderInfo) {
        let format = info.format;
        for ext in info.extensions {
            self.by_extension.insert(ext, format);
        }
        if self.decoders.insert(format, Arc::new(info)).is_some() {
            warn!(%format, "replacing registered decoder");
        }
    }

    /// Returns an iterator over registered format tags.
    pub fn formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.decoders.keys().copied()
    }

    /// Returns the decoder for a format tag.
    pub fn get(&self, format: ImageFormat) -> Option<&DecoderInfo> {
        self.decoders.get(&format).map(|arc| arc.as_ref())
    }

    /// Returns the decoder for a file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<&DecoderInfo> {
        let ext_lower = ext.to_lowercase();
        self.by_extension
            .get(ext_lower.as_str())
            .and_then(|format| self.get(*format))
    }

    /// Checks if an extension is supported.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.get_by_extension(ext).is_some()
    }

    /// Picks a decoder: magic bytes first, then the extension of `path`.
    pub fn select(&self, header: &[u8], path: Option<&Path>) -> Option<&DecoderInfo> {
        let head = &header[..header.len().min(16)];
        self.decoders
            .values()
            .find(|info| (info.can_read)(head))
            .map(|arc| arc.as_ref())
            .or_else(|| {
                path.and_then(|p| p.extension())
                    .and_then(|e| e.to_str())
                    .and_then(|ext| self.get_by_extension(ext))
            })
    }

    /// Decodes bytes, using `hint` when magic-byte detection fails.
    pub fn decode_memory(&self, bytes: &[u8], hint: Option<ImageFormat>) -> IoResult<DecodedImage> {
        let info = self
            .select(bytes, None)
            .or_else(|| hint.and_then(|f| self.get(f)))
            .ok_or_else(|| {
                IoError::UnsupportedFormat(
                    hint.map(|f| f.name().to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                )
            })?;
        (info.decode)(bytes)
    }

    /// Reads and decodes a file.
    ///
    /// The decoded image is named after the file stem unless the decoder
    /// set a name.
    pub fn decode_path(&self, path: &Path) -> IoResult<DecodedImage> {
        let bytes = std::fs::read(path)?;
        let info = self.select(&bytes, Some(path)).ok_or_else(|| {
            IoError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            )
        })?;
        debug!(path = %path.display(), decoder = info.name, "decoding");

        let mut image = (info.decode)(&bytes)?;
        if image.name.is_none() {
            image.name = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
        }
        Ok(image)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
