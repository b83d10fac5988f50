//! Error types for cache and texture operations.

use thiserror::Error;
use worktex_io::IoError;

/// Error type for working texture operations.
///
/// Core and decode errors are wrapped unchanged so callers can match on
/// the original variant.
#[derive(Error, Debug)]
pub enum TextureError {
    /// Buffer error (bounds, dimensions, decoded size mismatch).
    #[error(transparent)]
    Core(#[from] worktex_core::Error),

    /// Decode collaborator failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

impl TextureError {
    /// Returns `true` for out-of-range pixel access.
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_bounds_error())
    }

    /// Returns `true` when decoded samples did not match the dimensions.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_size_mismatch())
    }

    /// Returns `true` when the decode collaborator failed.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Result type for working texture operations.
pub type TextureResult<T> = Result<T, TextureError>;
