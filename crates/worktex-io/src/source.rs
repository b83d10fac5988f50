//! Source identity: the cache key of an external asset.

use crate::IoResult;
use std::path::Path;
use worktex_core::SourceId;

/// Derives the [`SourceId`] of the file at `path`.
///
/// The path is canonicalized first, so different spellings of the same
/// file (relative, `..`, symlinks) map to the same id.
///
/// # Errors
///
/// Returns an I/O error if the file does not exist.
pub fn source_identity<P: AsRef<Path>>(path: P) -> IoResult<SourceId> {
    let canonical = std::fs::canonicalize(path.as_ref())?;
    Ok(SourceId::from_key(&canonical.to_string_lossy()))
}
