//! Export boundary: turning a buffer snapshot into a platform texture.
//!
//! The core hands over an [`ExternalTexture`] once; a [`TextureSink`]
//! turns it into whatever the platform needs. Nothing flows back.
//!
//! Two sinks are provided:
//! - [`MemorySink`] packs samples into the byte layout of the texture's
//!   [`TextureFormat`] ([`PlatformTexture`])
//! - [`PngSink`] writes an 8-bit PNG file (requires the `png` feature)

use crate::IoResult;
use half::f16;
#[cfg(feature = "png")]
use std::path::PathBuf;
use worktex_core::{ExternalTexture, TextureFormat, WrapMode};

/// Consumer of exported textures.
pub trait TextureSink {
    /// What the sink produces per texture.
    type Output;

    /// Creates a platform texture from a snapshot.
    fn create(&mut self, texture: &ExternalTexture) -> IoResult<Self::Output>;
}

/// Clamps to `[0, 1]` and quantizes to 8 bits.
#[inline]
pub fn quantize_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Clamps to `[0, 1]` and quantizes to 16 bits.
#[inline]
pub fn quantize_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
}

/// Packs samples into the byte layout of `texture.format`.
///
/// Multi-byte channels are little-endian. Integer formats clamp to
/// `[0, 1]`; float formats keep the full range.
pub fn encode_samples(texture: &ExternalTexture) -> Vec<u8> {
    let format = texture.format;
    let mut out = Vec::with_capacity(texture.pixels.len() * format.bytes_per_pixel());
    for px in &texture.pixels {
        match format {
            TextureFormat::Alpha8 => out.push(quantize_u8(px.a)),
            TextureFormat::R8 => out.push(quantize_u8(px.r)),
            TextureFormat::Rgb24 => out.extend([px.r, px.g, px.b].map(quantize_u8)),
            TextureFormat::Rgba32 => out.extend([px.r, px.g, px.b, px.a].map(quantize_u8)),
            TextureFormat::Argb32 => out.extend([px.a, px.r, px.g, px.b].map(quantize_u8)),
            TextureFormat::Rgb48 => {
                for c in [px.r, px.g, px.b] {
                    out.extend_from_slice(&quantize_u16(c).to_le_bytes());
                }
            }
            TextureFormat::Rgba64 => {
                for c in px.to_array() {
                    out.extend_from_slice(&quantize_u16(c).to_le_bytes());
                }
            }
            TextureFormat::RgbaHalf => {
                for c in px.to_array() {
                    out.extend_from_slice(&f16::from_f32(c).to_le_bytes());
                }
            }
            TextureFormat::RgbaFloat => {
                for c in px.to_array() {
                    out.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
    }
    out
}

/// Texture packed for upload: bytes in the layout of `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformTexture {
    /// Packed pixel bytes, row 0 first.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Byte layout.
    pub format: TextureFormat,
    /// Linear-color flag.
    pub linear: bool,
    /// Wrap mode.
    pub wrap_mode: WrapMode,
    /// Name label.
    pub name: String,
}

/// Sink producing in-memory [`PlatformTexture`]s.
#[derive(Debug, Default)]
pub struct MemorySink;

impl TextureSink for MemorySink {
    type Output = PlatformTexture;

    fn create(&mut self, texture: &ExternalTexture) -> IoResult<PlatformTexture> {
        Ok(PlatformTexture {
            bytes: encode_samples(texture),
            width: texture.width,
            height: texture.height,
            format: texture.format,
            linear: texture.linear,
            wrap_mode: texture.wrap_mode,
            name: texture.name.clone(),
        })
    }
}

/// Sink writing each texture to a PNG file.
#[cfg(feature = "png")]
#[derive(Debug, Clone)]
pub struct PngSink {
    path: PathBuf,
}

#[cfg(feature = "png")]
impl PngSink {
    /// Writes to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "png")]
impl TextureSink for PngSink {
    type Output = PathBuf;

    fn create(&mut self, texture: &ExternalTexture) -> IoResult<PathBuf> {
        crate::png::write(&self.path, texture)?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktex_core::Rgba;

    fn one_pixel(format: TextureFormat, px: Rgba) -> ExternalTexture {
        ExternalTexture {
            pixels: vec![px],
            width: 1,
            height: 1,
            format,
            linear: true,
            wrap_mode: WrapMode::Clamp,
            name: "px".into(),
        }
    }

    #[test]
    fn quantize_clamps() {
        assert_eq!(quantize_u8(-1.0), 0);
        assert_eq!(quantize_u8(0.5), 128);
        assert_eq!(quantize_u8(3.0), 255);
        assert_eq!(quantize_u16(1.0), 65535);
    }

    #[test]
    fn byte_layouts() {
        let px = Rgba::new(1.0, 0.0, 0.5, 0.25);
        assert_eq!(encode_samples(&one_pixel(TextureFormat::Rgba32, px)), vec![255, 0, 128, 64]);
        assert_eq!(encode_samples(&one_pixel(TextureFormat::Argb32, px)), vec![64, 255, 0, 128]);
        assert_eq!(encode_samples(&one_pixel(TextureFormat::Alpha8, px)), vec![64]);
        assert_eq!(encode_samples(&one_pixel(TextureFormat::Rgb48, px)).len(), 6);

        let half = encode_samples(&one_pixel(TextureFormat::RgbaHalf, px));
        assert_eq!(half.len(), 8);
        assert_eq!(f16::from_le_bytes([half[4], half[5]]).to_f32(), 0.5);

        let float = encode_samples(&one_pixel(TextureFormat::RgbaFloat, Rgba::new(4.0, 0.0, 0.0, 1.0)));
        assert_eq!(f32::from_le_bytes([float[0], float[1], float[2], float[3]]), 4.0);
    }

    #[test]
    fn memory_sink_keeps_metadata() {
        let tex = one_pixel(TextureFormat::Rgb24, Rgba::WHITE);
        let out = MemorySink.create(&tex).expect("create");
        assert_eq!(out.bytes, vec![255, 255, 255]);
        assert_eq!(out.wrap_mode, WrapMode::Clamp);
        assert_eq!(out.name, "px");
    }
}
