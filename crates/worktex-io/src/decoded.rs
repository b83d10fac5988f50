//! Decoded image: the value every decoder hands to the core.

use worktex_core::{Rgba, TextureFormat, WrapMode};

/// Pixels decoded from an external asset.
///
/// `samples` is row-major with row 0 at the top and holds exactly
/// `width * height` entries for well-behaved decoders. The core re-checks
/// the count when it builds a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Row-major samples, channels normalized to `[0, 1]` for integer data.
    pub samples: Vec<Rgba>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `true` for linear color data, `false` for sRGB-encoded data.
    pub linear: bool,
    /// Wrap mode to use for the resulting texture.
    pub wrap_mode: WrapMode,
    /// Closest [`TextureFormat`] of the stored data.
    pub format: TextureFormat,
    /// Optional asset name (usually the file stem).
    pub name: Option<String>,
}

impl DecodedImage {
    /// Creates a decoded image with default wrap mode and no name.
    pub fn new(
        samples: Vec<Rgba>,
        width: u32,
        height: u32,
        format: TextureFormat,
        linear: bool,
    ) -> Self {
        Self {
            samples,
            width,
            height,
            linear,
            wrap_mode: WrapMode::default(),
            format,
            name: None,
        }
    }

    /// Creates a uniformly colored image. Handy for tests and placeholders.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self::new(
            vec![color; width as usize * height as usize],
            width,
            height,
            TextureFormat::RgbaFloat,
            true,
        )
    }

    /// Sets the wrap mode.
    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Expands interleaved, normalized channel data into [`Rgba`] samples.
///
/// - 1 channel: gray, opaque
/// - 2 channels: gray + alpha
/// - 3 channels: RGB, opaque
/// - 4 channels: RGBA
pub(crate) fn expand_channels(data: &[f32], channels: usize) -> Vec<Rgba> {
    match channels {
        1 => data.iter().map(|&g| Rgba::gray(g)).collect(),
        2 => data.chunks_exact(2).map(|ga| Rgba::new(ga[0], ga[0], ga[0], ga[1])).collect(),
        3 => data.chunks_exact(3).map(|c| Rgba::rgb(c[0], c[1], c[2])).collect(),
        _ => data.chunks_exact(4).map(|c| Rgba::new(c[0], c[1], c[2], c[3])).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_gray_alpha() {
        let out = expand_channels(&[0.5, 0.25, 1.0, 0.0], 2);
        assert_eq!(out, vec![Rgba::new(0.5, 0.5, 0.5, 0.25), Rgba::new(1.0, 1.0, 1.0, 0.0)]);
    }

    #[test]
    fn expand_rgb() {
        let out = expand_channels(&[1.0, 0.0, 0.0, 0.0, 0.0, 1.0], 3);
        assert_eq!(out, vec![Rgba::RED, Rgba::BLUE]);
    }

    #[test]
    fn filled_has_right_count() {
        let img = DecodedImage::filled(3, 2, Rgba::WHITE).with_name("white");
        assert_eq!(img.samples.len(), 6);
        assert_eq!(img.name.as_deref(), Some("white"));
    }
}
