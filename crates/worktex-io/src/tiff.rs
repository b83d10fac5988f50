//! TIFF format support (decode only).
//!
//! Handles 8/16-bit gray, gray+alpha, RGB and RGBA plus 32-bit float RGB
//! and RGBA. Float data is treated as linear; integer data as sRGB.

use crate::decoded::{DecodedImage, expand_channels};
use crate::{IoError, IoResult};
use std::io::Cursor;
use std::path::Path;
use worktex_core::TextureFormat;

/// Reads a TIFF file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<DecodedImage> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Decodes the first directory of a TIFF image held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    use tiff::ColorType;
    use tiff::decoder::{Decoder, DecodingResult};

    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;
    let color_type = decoder
        .colortype()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let result = decoder
        .read_image()
        .map_err(|e: tiff::TiffError| IoError::DecodeError(e.to_string()))?;

    let (data, channels, format, linear) = match (color_type, result) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => (norm_u8(&buf), 1, TextureFormat::R8, false),
        (ColorType::GrayA(8), DecodingResult::U8(buf)) => (norm_u8(&buf), 2, TextureFormat::Rgba32, false),
        (ColorType::RGB(8), DecodingResult::U8(buf)) => (norm_u8(&buf), 3, TextureFormat::Rgb24, false),
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => (norm_u8(&buf), 4, TextureFormat::Rgba32, false),
        (ColorType::Gray(16), DecodingResult::U16(buf)) => (norm_u16(&buf), 1, TextureFormat::R8, false),
        (ColorType::GrayA(16), DecodingResult::U16(buf)) => (norm_u16(&buf), 2, TextureFormat::Rgba64, false),
        (ColorType::RGB(16), DecodingResult::U16(buf)) => (norm_u16(&buf), 3, TextureFormat::Rgb48, false),
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => (norm_u16(&buf), 4, TextureFormat::Rgba64, false),
        (ColorType::RGB(32), DecodingResult::F32(buf)) => (buf, 3, TextureFormat::RgbaFloat, true),
        (ColorType::RGBA(32), DecodingResult::F32(buf)) => (buf, 4, TextureFormat::RgbaFloat, true),
        (ct, _) => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "unsupported TIFF color type: {:?}",
                ct
            )));
        }
    };

    Ok(DecodedImage::new(
        expand_channels(&data, channels),
        width,
        height,
        format,
        linear,
    ))
}

fn norm_u8(buf: &[u8]) -> Vec<f32> {
    buf.iter().map(|&v| v as f32 / 255.0).collect()
}

fn norm_u16(buf: &[u16]) -> Vec<f32> {
    buf.iter().map(|&v| v as f32 / 65535.0).collect()
}
