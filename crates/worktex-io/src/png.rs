//! PNG format support.
//!
//! Decoding covers 8-bit and 16-bit gray, gray+alpha, RGB and RGBA images;
//! palette and sub-byte images are expanded by the decoder. PNG data is
//! sRGB-encoded, so decoded images are flagged non-linear.
//!
//! Writing is 8-bit only and is used by the export boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use worktex_io::png;
//!
//! let image = png::read("albedo.png")?;
//! println!("{}x{}", image.width, image.height);
//! ```

use crate::decoded::{DecodedImage, expand_channels};
use crate::export::quantize_u8;
use crate::{IoError, IoResult};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use worktex_core::{ExternalTexture, TextureFormat};

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<DecodedImage> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Decodes a PNG image held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let buf = &buf[..info.buffer_size()];

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                other, info.bit_depth
            )));
        }
    };

    let (normalized, sixteen): (Vec<f32>, bool) = match info.bit_depth {
        png::BitDepth::Eight => (buf.iter().map(|&v| v as f32 / 255.0).collect(), false),
        png::BitDepth::Sixteen => (
            buf.chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]) as f32 / 65535.0)
                .collect(),
            true,
        ),
        depth => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                info.color_type, depth
            )));
        }
    };

    let format = match (channels, sixteen) {
        (1, _) => TextureFormat::R8,
        (3, false) => TextureFormat::Rgb24,
        (3, true) => TextureFormat::Rgb48,
        (_, false) => TextureFormat::Rgba32,
        (_, true) => TextureFormat::Rgba64,
    };

    Ok(DecodedImage::new(
        expand_channels(&normalized, channels),
        info.width,
        info.height,
        format,
        false,
    ))
}

/// Writes a texture to a PNG file.
///
/// Formats without alpha are written as RGB, everything else as RGBA.
/// Values are clamped to `[0, 1]` and quantized to 8 bits.
pub fn write<P: AsRef<Path>>(path: P, texture: &ExternalTexture) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    encode_to(BufWriter::new(file), texture)
}

/// Encodes a texture as PNG into memory.
pub fn encode(texture: &ExternalTexture) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    encode_to(&mut out, texture)?;
    Ok(out)
}

fn encode_to<W: Write>(writer: W, texture: &ExternalTexture) -> IoResult<()> {
    let with_alpha = texture.format.has_alpha();
    let color_type = if with_alpha {
        png::ColorType::Rgba
    } else {
        png::ColorType::Rgb
    };

    let mut encoder = png::Encoder::new(writer, texture.width, texture.height);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    if !texture.linear {
        encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    let mut data = Vec::with_capacity(texture.pixels.len() * if with_alpha { 4 } else { 3 });
    for px in &texture.pixels {
        data.push(quantize_u8(px.r));
        data.push(quantize_u8(px.g));
        data.push(quantize_u8(px.b));
        if with_alpha {
            data.push(quantize_u8(px.a));
        }
    }

    png_writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}
