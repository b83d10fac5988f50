//! Copy-on-write texture handle.
//!
//! A [`WorkingTexture`] is a counted reference to one buffer in a
//! [`BufferCache`]. Cloning a handle is cheap and shares pixels; the first
//! write through a shared handle copies the buffer and retargets that
//! handle only. Dropping (or [`dispose`](WorkingTexture::dispose)-ing) a
//! handle releases its reference.
//!
//! # Example
//!
//! ```ignore
//! use worktex_cache::{BufferCache, WorkingTexture};
//! use worktex_core::{Rgba, TextureFormat};
//!
//! let cache = BufferCache::new();
//! let mut a = WorkingTexture::new(&cache, TextureFormat::Rgba32, 16, 16, true)?;
//! a.fill(Rgba::RED);
//!
//! let mut b = a.clone();          // shares pixels
//! b.set_pixel(0, 0, Rgba::BLUE)?; // b now owns a private copy
//! assert_eq!(a.pixel(0, 0)?, Rgba::RED);
//! ```

use std::path::Path;

use tracing::trace;
use worktex_core::{BufferId, ExternalTexture, PixelBuffer, Rgba, SourceId, TextureFormat, WrapMode};
use worktex_io::{DecodedImage, DecoderRegistry, IoResult, TextureSink, source_identity};

use crate::cache::{BufferCache, BufferKey};
use crate::resize::resize;
use crate::sample::{Sampling, sample};
use crate::TextureResult;

/// Counted, copy-on-write reference to a cached pixel buffer.
pub struct WorkingTexture {
    cache: BufferCache,
    key: BufferKey,
}

impl WorkingTexture {
    /// Creates a texture backed by a fresh zeroed buffer.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDimensions`](worktex_core::Error::InvalidDimensions)
    /// if either dimension is zero.
    pub fn new(
        cache: &BufferCache,
        format: TextureFormat,
        width: u32,
        height: u32,
        linear: bool,
    ) -> TextureResult<Self> {
        let key = cache.acquire_fresh(format, width, height, linear)?;
        Ok(Self::from_key(cache, key))
    }

    /// Creates a texture for an external asset, sharing the buffer with
    /// every other texture of the same source.
    ///
    /// `decode` runs only when `source` is not cached yet.
    pub fn from_source<F>(cache: &BufferCache, source: SourceId, decode: F) -> TextureResult<Self>
    where
        F: FnOnce() -> IoResult<DecodedImage>,
    {
        let key = cache.acquire_from_source(source, decode)?;
        Ok(Self::from_key(cache, key))
    }

    /// Loads an image file through `registry`.
    ///
    /// The file's canonical path is the source identity, so loading the
    /// same file again shares its buffer.
    pub fn load(cache: &BufferCache, registry: &DecoderRegistry, path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let source = source_identity(path)?;
        Self::from_source(cache, source, || registry.decode_path(path))
    }

    /// Wraps a key whose reference the caller transfers to the handle.
    pub fn from_key(cache: &BufferCache, key: BufferKey) -> Self {
        Self {
            cache: cache.clone(),
            key,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> R {
        let state = self.cache.lock();
        f(state.buffer(self.key))
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut PixelBuffer) -> R) -> R {
        let mut state = self.cache.lock();
        self.key = state.make_writable(self.key);
        f(state.buffer_mut(self.key))
    }

    /// Cache this handle belongs to.
    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    /// Arena key of the current buffer.
    pub fn key(&self) -> BufferKey {
        self.key
    }

    /// Identity of the current buffer.
    pub fn id(&self) -> BufferId {
        self.read(PixelBuffer::id)
    }

    /// Returns `true` if both handles currently share a buffer.
    pub fn same_buffer(&self, other: &WorkingTexture) -> bool {
        self.key == other.key && self.cache.same_cache(&other.cache)
    }

    /// Asset the current buffer was decoded from, if any.
    pub fn source(&self) -> Option<SourceId> {
        self.read(PixelBuffer::source)
    }

    /// Returns `true` if the current buffer was decoded from an asset.
    pub fn has_source(&self) -> bool {
        self.read(PixelBuffer::has_source)
    }

    /// Name label.
    pub fn name(&self) -> String {
        self.read(|b| b.name().to_string())
    }

    /// Sets the name label. Copies the buffer first if it is shared.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.write(|b| b.set_name(name));
    }

    /// Pixel layout.
    pub fn format(&self) -> TextureFormat {
        self.read(PixelBuffer::format)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.read(PixelBuffer::width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.read(PixelBuffer::height)
    }

    /// Returns (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.read(PixelBuffer::dimensions)
    }

    /// Linear-color flag.
    pub fn linear(&self) -> bool {
        self.read(PixelBuffer::linear)
    }

    /// Sets the linear-color flag. Copies the buffer first if it is shared.
    pub fn set_linear(&mut self, linear: bool) {
        self.write(|b| b.set_linear(linear));
    }

    /// Wrap mode.
    pub fn wrap_mode(&self) -> WrapMode {
        self.read(PixelBuffer::wrap_mode)
    }

    /// Sets the wrap mode. Copies the buffer first if it is shared.
    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.write(|b| b.set_wrap_mode(wrap_mode));
    }

    /// References to the current buffer, this handle included.
    pub fn ref_count(&self) -> usize {
        self.cache.ref_count(self.key)
    }

    /// Returns `true` if another reference shares the buffer.
    pub fn is_shared(&self) -> bool {
        self.ref_count() > 1
    }

    /// Returns the sample at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`](worktex_core::Error::OutOfBounds) outside
    /// the texture.
    pub fn pixel(&self, x: u32, y: u32) -> TextureResult<Rgba> {
        Ok(self.read(|b| b.pixel(x, y))?)
    }

    /// Returns the sample at any integer coordinate, resolved through the
    /// wrap mode.
    pub fn pixel_wrapped(&self, x: i64, y: i64) -> Rgba {
        self.read(|b| b.pixel_wrapped(x, y))
    }

    /// Writes the sample at (x, y), copying a shared buffer first.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`](worktex_core::Error::OutOfBounds) outside
    /// the texture; nothing is copied or written in that case.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) -> TextureResult<()> {
        let (w, h) = self.dimensions();
        if x >= w || y >= h {
            return Err(worktex_core::Error::out_of_bounds(x, y, w, h).into());
        }
        Ok(self.write(|b| b.set_pixel(x, y, color))?)
    }

    /// Sets every sample, copying a shared buffer first.
    pub fn fill(&mut self, color: Rgba) {
        self.write(|b| b.fill(color));
    }

    /// Bilinear sample at normalized `(u, v)`; see [`sample`](crate::sample::sample).
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        self.sample_with(u, v, Sampling::Bilinear)
    }

    /// Sample at normalized `(u, v)` with an explicit mode.
    pub fn sample_with(&self, u: f32, v: f32, mode: Sampling) -> Rgba {
        self.read(|b| sample(b, u, v, mode))
    }

    /// Copies all of `source` into this texture at `(x, y)`, clipped to
    /// this texture's bounds. Copies a shared destination first.
    ///
    /// `source` may share this texture's buffer; it keeps seeing the
    /// pixels from before the blit.
    pub fn blit(&mut self, source: &WorkingTexture, x: i32, y: i32) {
        trace!(dst = ?self.key, src = ?source.key, x, y, "blit");
        if !self.cache.same_cache(&source.cache) {
            let snapshot = source.read(PixelBuffer::duplicate);
            self.write(|dst| dst.blit_from(&snapshot, x, y));
            return;
        }

        let mut state = self.cache.lock();
        self.key = state.make_writable(self.key);
        // a shared buffer was copied above, so the slots differ
        let (dst, src) = state.pair_mut(self.key, source.key);
        dst.blit_from(src, x, y);
    }

    /// Eager private copy: same pixels and metadata, new identity, no
    /// source link.
    pub fn duplicate(&self) -> WorkingTexture {
        let key = self.cache.acquire_duplicate(self.key);
        Self::from_key(&self.cache, key)
    }

    /// Bilinear resize into a new texture of `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDimensions`](worktex_core::Error::InvalidDimensions)
    /// if either dimension is zero.
    pub fn resize(&self, width: u32, height: u32) -> TextureResult<WorkingTexture> {
        self.resize_with(width, height, Sampling::Bilinear)
    }

    /// Resize with an explicit sampling mode.
    pub fn resize_with(&self, width: u32, height: u32, mode: Sampling) -> TextureResult<WorkingTexture> {
        trace!(key = ?self.key, width, height, %mode, "resize");
        let mut state = self.cache.lock();
        let out = resize(state.buffer(self.key), width, height, mode)?;
        let key = state.add(out);
        drop(state);
        Ok(Self::from_key(&self.cache, key))
    }

    /// Snapshot handed to platform texture creation.
    pub fn to_external(&self) -> ExternalTexture {
        self.read(PixelBuffer::to_external)
    }

    /// Exports the texture through `sink`.
    pub fn to_platform<S: TextureSink>(&self, sink: &mut S) -> TextureResult<S::Output> {
        Ok(sink.create(&self.to_external())?)
    }

    /// Releases this handle's reference.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Clone for WorkingTexture {
    fn clone(&self) -> Self {
        self.cache.add_ref(self.key);
        Self::from_key(&self.cache, self.key)
    }
}

impl Drop for WorkingTexture {
    fn drop(&mut self) {
        self.cache.release(self.key);
    }
}

impl std::fmt::Debug for WorkingTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.cache.lock();
        let buffer = state.buffer(self.key);
        f.debug_struct("WorkingTexture")
            .field("id", &buffer.id())
            .field("name", &buffer.name())
            .field("size", &buffer.dimensions())
            .field("format", &buffer.format())
            .field("refs", &state.slot_refs(self.key))
            .finish()
    }
}
