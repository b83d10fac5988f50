//! Texture metadata: pixel format tag and wrap mode.
//!
//! Samples are always stored as [`Rgba`](crate::Rgba) `f32`; [`TextureFormat`]
//! records the format the texture came from (or should be exported as).

use std::fmt;

/// Pixel format tag carried by every buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Single 8-bit alpha channel.
    Alpha8,
    /// Single 8-bit red/gray channel.
    R8,
    /// 8-bit RGB.
    Rgb24,
    /// 8-bit RGBA.
    #[default]
    Rgba32,
    /// 8-bit ARGB (alpha stored first).
    Argb32,
    /// 16-bit RGB.
    Rgb48,
    /// 16-bit RGBA.
    Rgba64,
    /// 16-bit float RGBA.
    RgbaHalf,
    /// 32-bit float RGBA.
    RgbaFloat,
}

impl TextureFormat {
    /// Number of stored channels.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Alpha8 | Self::R8 => 1,
            Self::Rgb24 | Self::Rgb48 => 3,
            Self::Rgba32 | Self::Argb32 | Self::Rgba64 | Self::RgbaHalf | Self::RgbaFloat => 4,
        }
    }

    /// Bytes per channel.
    #[inline]
    pub const fn bytes_per_channel(self) -> usize {
        match self {
            Self::Alpha8 | Self::R8 | Self::Rgb24 | Self::Rgba32 | Self::Argb32 => 1,
            Self::Rgb48 | Self::Rgba64 | Self::RgbaHalf => 2,
            Self::RgbaFloat => 4,
        }
    }

    /// Bytes per pixel in the exported representation.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.channels() * self.bytes_per_channel()
    }

    /// Returns `true` if the format stores alpha.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, Self::R8 | Self::Rgb24 | Self::Rgb48)
    }

    /// Returns `true` for floating-point formats.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::RgbaHalf | Self::RgbaFloat)
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alpha8 => "Alpha8",
            Self::R8 => "R8",
            Self::Rgb24 => "RGB24",
            Self::Rgba32 => "RGBA32",
            Self::Argb32 => "ARGB32",
            Self::Rgb48 => "RGB48",
            Self::Rgba64 => "RGBA64",
            Self::RgbaHalf => "RGBAHalf",
            Self::RgbaFloat => "RGBAFloat",
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How coordinates outside `[0, size)` map back into the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Clamp to the edge texel.
    Clamp,
    /// Tile, flipping every other repetition.
    Mirror,
    /// Mirror once around zero, then clamp.
    MirrorOnce,
}

impl WrapMode {
    /// Maps an arbitrary integer coordinate into `[0, size)`.
    ///
    /// `size` must be non-zero.
    pub fn resolve(self, coord: i64, size: u32) -> u32 {
        debug_assert!(size > 0, "wrap into empty axis");
        let size = size as i64;
        let resolved = match self {
            Self::Repeat => coord.rem_euclid(size),
            Self::Clamp => coord.clamp(0, size - 1),
            Self::Mirror => {
                let period = size * 2;
                let m = coord.rem_euclid(period);
                if m < size { m } else { period - 1 - m }
            }
            Self::MirrorOnce => {
                let c = if coord < 0 { -coord - 1 } else { coord };
                c.min(size - 1)
            }
        };
        resolved as u32
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::Clamp => "clamp",
            Self::Mirror => "mirror",
            Self::MirrorOnce => "mirror-once",
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
