//! # worktex-cache
//!
//! Shared pixel buffers with reference counting, source deduplication and
//! copy-on-write.
//!
//! - [`BufferCache`] - Arena of counted buffers plus the source index
//! - [`WorkingTexture`] - Handle: `Clone` shares, writes copy, `Drop` releases
//! - [`sample`] - Bilinear sampling at normalized coordinates
//! - [`resize`] - Pull-style resampling into a new buffer
//!
//! ## Sharing model
//!
//! ```text
//!  WorkingTexture a ──┐
//!  WorkingTexture b ──┼──> BufferKey ──> Slot { PixelBuffer, refs: 3 }
//!  WorkingTexture c ──┘                      ^
//!                                            |
//!                          by_source[SourceId]  (decoded assets only)
//! ```
//!
//! A write through `b` copies the buffer into a new slot (`refs: 1`) and
//! leaves `a` and `c` on the original (`refs: 2`). A write through the only
//! handle of a decoded asset removes it from the source index first, so the
//! next load of that asset decodes again.
//!
//! The cache is an explicit value: create one per pipeline run (or per
//! test) and pass it to the constructors. All bookkeeping runs under one
//! mutex, so handles may move between threads.
//!
//! # Example
//!
//! ```ignore
//! use worktex_cache::{BufferCache, WorkingTexture};
//! use worktex_io::DecoderRegistry;
//!
//! let cache = BufferCache::new();
//! let registry = DecoderRegistry::with_builtin();
//!
//! let a = WorkingTexture::load(&cache, &registry, "albedo.png")?;
//! let b = WorkingTexture::load(&cache, &registry, "albedo.png")?;
//! assert_eq!(a.id(), b.id());
//!
//! let thumb = a.resize(64, 64)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod error;
pub mod resize;
pub mod sample;
pub mod texture;

pub use cache::{BufferCache, BufferKey, CacheStats};
pub use error::{TextureError, TextureResult};
pub use sample::Sampling;
pub use texture::WorkingTexture;
