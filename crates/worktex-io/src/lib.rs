//! # worktex-io
//!
//! Decode and export boundary for working textures.
//!
//! The core only ever sees a [`DecodedImage`]: row-major [`Rgba`](worktex_core::Rgba)
//! samples plus width, height, linear flag and wrap mode. Everything
//! format-specific lives here:
//!
//! - **PNG** - 8/16-bit, gray/RGB/alpha, palette expanded
//! - **TIFF** - 8/16-bit integer, 32-bit float
//! - **TGA** - true-color and grayscale, raw and RLE
//!
//! # Architecture
//!
//! - [`DecoderRegistry`] - decoders keyed by [`ImageFormat`], selected
//!   once per file by magic bytes or extension
//! - [`source_identity`] - stable cache key for a file
//! - [`TextureSink`] - one-way conversion into a platform texture
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use worktex_io::{DecoderRegistry, source_identity};
//!
//! let registry = DecoderRegistry::with_builtin();
//! let id = source_identity("albedo.png")?;
//! let image = registry.decode_path("albedo.png".as_ref())?;
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `tiff` - TIFF support (default)
//! - `tga` - TGA support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod decoded;
mod detect;
mod error;
pub mod export;
pub mod registry;
mod source;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "tiff")]
pub mod tiff;

#[cfg(feature = "tga")]
pub mod tga;

pub use decoded::DecodedImage;
pub use detect::ImageFormat;
pub use error::{IoError, IoResult};
pub use export::{MemorySink, PlatformTexture, TextureSink, encode_samples};
pub use registry::{DecoderInfo, DecoderRegistry};
pub use source::source_identity;

#[cfg(feature = "png")]
pub use export::PngSink;
