//! CLI command implementations

pub mod atlas;
pub mod info;
pub mod resize;
pub mod sample;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use worktex_cache::{BufferCache, WorkingTexture};
use worktex_io::{DecoderRegistry, PngSink};

/// Load texture from path through the shared cache
pub fn load_texture(cache: &BufferCache, registry: &DecoderRegistry, path: &Path) -> Result<WorkingTexture> {
    WorkingTexture::load(cache, registry, path)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save texture to a PNG file
pub fn save_texture(path: &Path, texture: &WorkingTexture) -> Result<()> {
    texture
        .to_platform(&mut PngSink::new(path))
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    Ok(())
}

/// Log cache statistics before a command exits
pub fn log_stats(cache: &BufferCache) {
    let stats = cache.stats();
    debug!(
        hits = stats.hits,
        misses = stats.misses,
        duplicates = stats.duplicates,
        destroyed = stats.destroyed,
        peak_live = stats.peak_live,
        live = cache.live_buffers(),
        "cache stats"
    );
}

/// Format byte count for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
