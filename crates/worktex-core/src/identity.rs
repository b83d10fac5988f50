//! Identity tokens for buffers and external sources.
//!
//! - [`SourceId`] keys the buffer cache. It is derived deterministically
//!   from a string key (usually a canonical file path), so the same asset
//!   always maps to the same id within a process.
//! - [`BufferId`] names one buffer. Buffers loaded from a source reuse the
//!   source's UUID; everything else gets a random one.

use std::fmt;
use uuid::Uuid;

/// Stable identity of an external image asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Uuid);

impl SourceId {
    /// Derives a source id from a stable key (UUID v5, URL namespace).
    pub fn from_key(key: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
    }

    /// Wraps an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src:{}", self.0.hyphenated())
    }
}

/// Globally unique identity token of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(Uuid);

impl BufferId {
    /// Generates a fresh random id.
    #[inline]
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of a buffer decoded from `source`.
    #[inline]
    pub const fn for_source(source: &SourceId) -> Self {
        Self(source.uuid())
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
