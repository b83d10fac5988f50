//! # worktex-core
//!
//! Core types for working textures.
//!
//! This crate provides the leaf types used throughout the worktex workspace:
//!
//! - [`Rgba`] - Four-channel `f32` color sample
//! - [`TextureFormat`], [`WrapMode`] - Texture metadata
//! - [`BufferId`], [`SourceId`] - Identity tokens
//! - [`PixelBuffer`] - Dense pixel storage with clipping blit and duplication
//! - [`ExternalTexture`] - Boundary snapshot for platform texture creation
//!
//! ## Crate Structure
//!
//! ```text
//! worktex-core (this crate)
//!    ^
//!    |
//!    +-- worktex-io (decoders, export boundary)
//!    +-- worktex-cache (buffer cache, copy-on-write handles)
//!    +-- worktex-cli
//! ```
//!
//! A `PixelBuffer` has no notion of sharing. Reference counting, source
//! deduplication and copy-on-write are layered on top by `worktex-cache`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod identity;
pub mod pixel;

pub use buffer::{ExternalTexture, PixelBuffer};
pub use error::{Error, Result};
pub use format::{TextureFormat, WrapMode};
pub use identity::{BufferId, SourceId};
pub use pixel::Rgba;

/// Prelude module for convenient imports.
///
/// ```
/// use worktex_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{ExternalTexture, PixelBuffer};
    pub use crate::error::{Error, Result};
    pub use crate::format::{TextureFormat, WrapMode};
    pub use crate::identity::{BufferId, SourceId};
    pub use crate::pixel::Rgba;
}
