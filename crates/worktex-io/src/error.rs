//! Error types for decode and export operations.
//!
//! Provides unified error handling for every format handled at the
//! worktex boundary.

use std::io;
use thiserror::Error;

/// Decode/export boundary error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth or color layout.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),
}

impl IoError {
    /// Returns `true` if the error came from a decoder rather than the
    /// file system.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::DecodeError(_) | Self::InvalidFile(_) | Self::UnsupportedBitDepth(_)
        )
    }
}

/// Result type for decode/export operations.
pub type IoResult<T> = Result<T, IoError>;
