//! Pixel buffer: the storage behind every working texture.
//!
//! A [`PixelBuffer`] owns a dense, row-major array of `width * height`
//! [`Rgba`] samples plus format metadata. It knows nothing about sharing;
//! reference counting and source deduplication live in `worktex-cache`.
//!
//! # Memory Layout
//!
//! Row 0 is the top row. The sample for `(x, y)` lives at `y * width + x`:
//!
//! ```text
//! [p(0,0) p(1,0) ... p(w-1,0)]  <- row 0
//! [p(0,1) p(1,1) ... p(w-1,1)]  <- row 1
//! ...
//! ```
//!
//! # Example
//!
//! ```rust
//! use worktex_core::{PixelBuffer, Rgba, TextureFormat};
//!
//! let mut buf = PixelBuffer::new(TextureFormat::Rgba32, 4, 4, true)?;
//! buf.set_pixel(1, 2, Rgba::RED)?;
//! assert_eq!(buf.pixel(1, 2)?, Rgba::RED);
//! assert!(buf.pixel(4, 0).is_err());
//! # Ok::<(), worktex_core::Error>(())
//! ```

use crate::{BufferId, Error, Result, Rgba, SourceId, TextureFormat, WrapMode};

/// Validates dimensions and returns `width * height`.
fn sample_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "dimensions must be positive"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows"))
}

/// Owned pixel storage with texture metadata.
///
/// Not `Clone`: copies go through [`duplicate`](Self::duplicate) so every
/// buffer keeps a unique identity.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: TextureFormat,
    linear: bool,
    wrap_mode: WrapMode,
    name: String,
    id: BufferId,
    /// Set only for buffers decoded from an external asset.
    source: Option<SourceId>,
    samples: Vec<Rgba>,
}

impl PixelBuffer {
    /// Creates a zero-initialized buffer with a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn new(format: TextureFormat, width: u32, height: u32, linear: bool) -> Result<Self> {
        let count = sample_count(width, height)?;
        Ok(Self {
            width,
            height,
            format,
            linear,
            wrap_mode: WrapMode::default(),
            name: String::new(),
            id: BufferId::fresh(),
            source: None,
            samples: vec![Rgba::CLEAR; count],
        })
    }

    /// Creates a buffer from decoded samples of an external asset.
    ///
    /// The samples are taken over as-is. The buffer's identity is derived
    /// from `source` and it keeps a back-link to it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if either dimension is zero
    /// - [`Error::SizeMismatch`] if `samples.len() != width * height`
    pub fn from_source(
        source: SourceId,
        samples: Vec<Rgba>,
        width: u32,
        height: u32,
        format: TextureFormat,
        linear: bool,
        wrap_mode: WrapMode,
    ) -> Result<Self> {
        let count = sample_count(width, height)?;
        if samples.len() != count {
            return Err(Error::size_mismatch(count, samples.len()));
        }
        Ok(Self {
            width,
            height,
            format,
            linear,
            wrap_mode,
            name: String::new(),
            id: BufferId::for_source(&source),
            source: Some(source),
            samples,
        })
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel format tag.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// `true` if samples are in linear color.
    #[inline]
    pub fn linear(&self) -> bool {
        self.linear
    }

    /// Sets the linear-color flag.
    #[inline]
    pub fn set_linear(&mut self, linear: bool) {
        self.linear = linear;
    }

    /// Wrap mode for out-of-range coordinates.
    #[inline]
    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    /// Sets the wrap mode.
    #[inline]
    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    /// Name label (empty if never set).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name label.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Identity token.
    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The source this buffer was decoded from, if any.
    #[inline]
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Returns `true` if the buffer is linked to an external source.
    #[inline]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.samples.len()
    }

    /// Memory held by the sample array in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.samples.len() * std::mem::size_of::<Rgba>()
    }

    /// Row-major sample slice.
    #[inline]
    pub fn samples(&self) -> &[Rgba] {
        &self.samples
    }

    /// Mutable row-major sample slice.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [Rgba] {
        &mut self.samples
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Returns the sample at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if (x, y) is outside the buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Result<Rgba> {
        let idx = self.index(x, y)?;
        Ok(self.samples[idx])
    }

    /// Writes the sample at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if (x, y) is outside the buffer.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) -> Result<()> {
        let idx = self.index(x, y)?;
        self.samples[idx] = color;
        Ok(())
    }

    /// Returns the sample at an arbitrary coordinate, resolved through the
    /// buffer's [`WrapMode`].
    #[inline]
    pub fn pixel_wrapped(&self, x: i64, y: i64) -> Rgba {
        let x = self.wrap_mode.resolve(x, self.width);
        let y = self.wrap_mode.resolve(y, self.height);
        self.samples[y as usize * self.width as usize + x as usize]
    }

    /// Sets every sample to `color`.
    pub fn fill(&mut self, color: Rgba) {
        self.samples.fill(color);
    }

    /// Copies every sample of `source` into this buffer at the given offset.
    ///
    /// Destination cells outside `[0, width) x [0, height)` are skipped.
    /// Partial or complete misses are not errors.
    pub fn blit_from(&mut self, source: &PixelBuffer, offset_x: i32, offset_y: i32) {
        let (ox, oy) = (offset_x as i64, offset_y as i64);
        let x0 = ox.max(0);
        let x1 = (ox + source.width as i64).min(self.width as i64);
        let y0 = oy.max(0);
        let y1 = (oy + source.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let run = (x1 - x0) as usize;
        let src_w = source.width as usize;
        let dst_w = self.width as usize;
        let src_x = (x0 - ox) as usize;
        for ty in y0..y1 {
            let sy = (ty - oy) as usize;
            let src_start = sy * src_w + src_x;
            let dst_start = ty as usize * dst_w + x0 as usize;
            self.samples[dst_start..dst_start + run]
                .copy_from_slice(&source.samples[src_start..src_start + run]);
        }
    }

    /// Allocates a copy with identical metadata, a fresh identity and no
    /// source link.
    pub fn duplicate(&self) -> PixelBuffer {
        let mut copy = PixelBuffer {
            width: self.width,
            height: self.height,
            format: self.format,
            linear: self.linear,
            wrap_mode: self.wrap_mode,
            name: self.name.clone(),
            id: BufferId::fresh(),
            source: None,
            samples: vec![Rgba::CLEAR; self.samples.len()],
        };
        copy.blit_from(self, 0, 0);
        copy
    }

    /// Produces the boundary representation handed to platform texture
    /// creation.
    pub fn to_external(&self) -> ExternalTexture {
        ExternalTexture {
            pixels: self.samples.clone(),
            width: self.width,
            height: self.height,
            format: self.format,
            linear: self.linear,
            wrap_mode: self.wrap_mode,
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("linear", &self.linear)
            .field("wrap_mode", &self.wrap_mode)
            .field("source", &self.source)
            .finish()
    }
}

/// Row-major snapshot of a buffer, the input of platform texture creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTexture {
    /// `width * height` samples, row 0 first.
    pub pixels: Vec<Rgba>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format tag.
    pub format: TextureFormat,
    /// Linear-color flag.
    pub linear: bool,
    /// Wrap mode.
    pub wrap_mode: WrapMode,
    /// Name label.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(TextureFormat::RgbaFloat, w, h, true).unwrap();
        for y in 0..h {
            for x in 0..w {
                buf.set_pixel(x, y, Rgba::new(x as f32, y as f32, 0.0, 1.0)).unwrap();
            }
        }
        buf
    }

    #[test]
    fn new_is_zeroed() {
        let buf = PixelBuffer::new(TextureFormat::Rgba32, 3, 2, false).unwrap();
        assert_eq!(buf.pixel_count(), 6);
        assert!(buf.samples().iter().all(|&c| c == Rgba::CLEAR));
        assert!(!buf.has_source());
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(PixelBuffer::new(TextureFormat::Rgba32, 0, 2, false).is_err());
        assert!(PixelBuffer::new(TextureFormat::Rgba32, 2, 0, false).is_err());
    }

    #[test]
    fn from_source_checks_count() {
        let src = SourceId::from_key("a.png");
        let err = PixelBuffer::from_source(
            src,
            vec![Rgba::WHITE; 3],
            2,
            2,
            TextureFormat::Rgba32,
            false,
            WrapMode::Clamp,
        )
        .unwrap_err();
        assert!(err.is_size_mismatch());

        let buf = PixelBuffer::from_source(
            src,
            vec![Rgba::WHITE; 4],
            2,
            2,
            TextureFormat::Rgba32,
            false,
            WrapMode::Clamp,
        )
        .unwrap();
        assert_eq!(buf.source(), Some(src));
        assert_eq!(buf.id(), BufferId::for_source(&src));
        assert_eq!(buf.wrap_mode(), WrapMode::Clamp);
    }

    #[test]
    fn out_of_bounds_access() {
        let mut buf = PixelBuffer::new(TextureFormat::Rgba32, 2, 2, false).unwrap();
        assert!(buf.pixel(2, 0).unwrap_err().is_bounds_error());
        assert!(buf.set_pixel(0, 2, Rgba::RED).unwrap_err().is_bounds_error());
    }

    #[test]
    fn blit_clips_larger_source() {
        let src = numbered(4, 4);
        let mut dst = PixelBuffer::new(TextureFormat::RgbaFloat, 2, 2, true).unwrap();
        dst.blit_from(&src, 0, 0);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(dst.pixel(x, y).unwrap(), src.pixel(x, y).unwrap());
            }
        }
    }

    #[test]
    fn blit_negative_offset() {
        let src = numbered(3, 3);
        let mut dst = PixelBuffer::new(TextureFormat::RgbaFloat, 3, 3, true).unwrap();
        dst.blit_from(&src, -1, -2);
        // only source row 2 lands, at dst row 0
        assert_eq!(dst.pixel(0, 0).unwrap(), src.pixel(1, 2).unwrap());
        assert_eq!(dst.pixel(1, 0).unwrap(), src.pixel(2, 2).unwrap());
        assert_eq!(dst.pixel(2, 0).unwrap(), Rgba::CLEAR);
        assert_eq!(dst.pixel(0, 1).unwrap(), Rgba::CLEAR);
    }

    #[test]
    fn blit_fully_outside_is_noop() {
        let src = numbered(2, 2);
        let mut dst = PixelBuffer::new(TextureFormat::RgbaFloat, 2, 2, true).unwrap();
        dst.blit_from(&src, 5, 0);
        dst.blit_from(&src, 0, -2);
        assert!(dst.samples().iter().all(|&c| c == Rgba::CLEAR));
    }

    #[test]
    fn duplicate_copies_pixels_not_identity() {
        let mut src = numbered(3, 2);
        src.set_name("albedo");
        src.set_wrap_mode(WrapMode::Mirror);
        let copy = src.duplicate();
        assert_ne!(copy.id(), src.id());
        assert_eq!(copy.samples(), src.samples());
        assert_eq!(copy.name(), "albedo");
        assert_eq!(copy.wrap_mode(), WrapMode::Mirror);
        assert_eq!(copy.format(), src.format());
        assert!(!copy.has_source());
    }

    #[test]
    fn source_identity_survives_writes() {
        let src = SourceId::from_key("b.png");
        let mut buf = PixelBuffer::from_source(
            src,
            vec![Rgba::BLACK; 1],
            1,
            1,
            TextureFormat::Rgb24,
            false,
            WrapMode::Repeat,
        )
        .unwrap();
        let before = buf.id();
        buf.set_pixel(0, 0, Rgba::WHITE).unwrap();
        buf.fill(Rgba::RED);
        assert_eq!(buf.id(), before);
        assert_eq!(buf.id(), BufferId::for_source(&src));
        assert_eq!(buf.source(), Some(src));
    }

    #[test]
    fn wrapped_reads() {
        let mut buf = numbered(3, 1);
        buf.set_wrap_mode(WrapMode::Repeat);
        assert_eq!(buf.pixel_wrapped(-1, 0), buf.pixel(2, 0).unwrap());
        buf.set_wrap_mode(WrapMode::Clamp);
        assert_eq!(buf.pixel_wrapped(7, 3), buf.pixel(2, 0).unwrap());
    }

    #[test]
    fn external_is_row_major() {
        let buf = numbered(2, 2);
        let ext = buf.to_external();
        assert_eq!(ext.pixels.len(), 4);
        assert_eq!(ext.pixels[1], Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(ext.pixels[2], Rgba::new(0.0, 1.0, 0.0, 1.0));
    }
}
